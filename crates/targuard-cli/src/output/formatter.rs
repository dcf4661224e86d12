//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use targuard_core::ArchiveManifest;
use targuard_core::ExtractionReport;
use targuard_core::VerificationReport;

use crate::pipeline::ScenarioOutcome;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format extraction result; `source` names the archive or URL.
    fn format_extraction_result(&self, source: &str, report: &ExtractionReport) -> Result<()>;

    /// Format manifest listing (short format, paths only)
    fn format_manifest_short(&self, manifest: &ArchiveManifest) -> Result<()>;

    /// Format manifest listing (long format, with details)
    fn format_manifest_long(&self, manifest: &ArchiveManifest, human_readable: bool) -> Result<()>;

    /// Format verification report
    fn format_verification_report(&self, report: &VerificationReport) -> Result<()>;

    /// Format pipeline scenario results
    fn format_scenario_results(&self, outcomes: &[ScenarioOutcome]) -> Result<()>;
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
        }
    }

    /// Completed operation whose result is negative (unsafe archive, failed
    /// scenario). The data is still reported.
    pub fn failure(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Failure,
            data: Some(data),
        }
    }
}
