//! Safe archive extraction: scan every member, then write.

pub mod engine;
pub mod plan;
pub(crate) mod writer;

pub use engine::Extractor;
pub use plan::ExtractionPlan;
pub use plan::PlanSummary;
pub use plan::PlannedMember;
