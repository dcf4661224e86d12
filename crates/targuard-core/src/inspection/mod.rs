//! Archive inspection without extraction.
//!
//! Listing reads member headers only. Verification runs the same scan that
//! extraction runs, against a real destination, and reports the first
//! violation instead of returning it as an error.
//!
//! # Examples
//!
//! ```no_run
//! use targuard_core::ExtractConfig;
//! use targuard_core::list_archive;
//! use targuard_core::verify_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = list_archive("results.tar.gz")?;
//! println!("Archive contains {} members", manifest.total_entries);
//!
//! let report = verify_archive("results.tar.gz", "analysis", &ExtractConfig::default())?;
//! if report.is_safe() {
//!     println!("Archive is safe to extract");
//! }
//! # Ok(())
//! # }
//! ```

pub mod list;
pub mod manifest;
pub mod verify;

pub use list::list_members;
pub use manifest::ArchiveManifest;
pub use verify::VerificationReport;
pub use verify::verify;
