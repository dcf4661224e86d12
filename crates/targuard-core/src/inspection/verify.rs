//! Dry-run verification.

use std::path::PathBuf;

use crate::ExtractConfig;
use crate::Result;
use crate::extraction::ExtractionPlan;
use crate::extraction::PlanSummary;
use crate::formats::ArchiveSource;
use crate::types::DestDir;

/// Outcome of a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// `true` if extraction would pass every security check.
    pub safe: bool,

    /// Description of the first violation.
    pub issue: Option<String>,

    /// Member path named by the first violation, if any.
    pub offending_path: Option<PathBuf>,

    /// Planned member counts (all zero when unsafe).
    pub summary: PlanSummary,
}

impl VerificationReport {
    /// Returns `true` if the archive can be extracted safely.
    #[must_use]
    pub const fn is_safe(&self) -> bool {
        self.safe
    }
}

/// Scans `source` against `dest` without writing anything.
///
/// Security violations are reported in the returned report. Other failures
/// (unreadable or corrupt archive, I/O errors) are returned as errors.
///
/// # Errors
///
/// Returns `InvalidArchive` or `Io` if the archive cannot be scanned.
pub fn verify(
    source: &ArchiveSource,
    dest: &DestDir,
    config: &ExtractConfig,
) -> Result<VerificationReport> {
    match ExtractionPlan::scan(source, dest, config) {
        Ok(plan) => Ok(VerificationReport {
            safe: true,
            issue: None,
            offending_path: None,
            summary: plan.summary(),
        }),
        Err(e) if e.is_security_violation() => Ok(VerificationReport {
            safe: false,
            offending_path: e.offending_path().map(PathBuf::from),
            issue: Some(e.to_string()),
            summary: PlanSummary::default(),
        }),
        Err(e) => Err(e),
    }
}
