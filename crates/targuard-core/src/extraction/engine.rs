//! Core extraction engine.

use std::time::Instant;

use tracing::info;
use tracing::warn;

use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::extraction::plan::ExtractionPlan;
use crate::extraction::writer::write_plan;
use crate::formats::ArchiveSource;
use crate::types::DestDir;

/// Scan-then-extract archive extractor.
///
/// Every member is validated before the first byte is written. If any
/// member fails, the destination is left exactly as it was (it is not even
/// created).
///
/// # Examples
///
/// ```no_run
/// use targuard_core::ExtractConfig;
/// use targuard_core::extraction::Extractor;
/// use targuard_core::formats::ArchiveSource;
/// use targuard_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = Extractor::new(ExtractConfig::default());
/// let source = ArchiveSource::from_path("results.tar.gz");
/// let report = extractor.extract(&source, &DestDir::new("analysis")?)?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    /// Creates an extractor with the given configuration.
    #[must_use]
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Runs the scan phase only.
    ///
    /// # Errors
    ///
    /// Returns the first member that fails validation, or an archive read
    /// error.
    pub fn plan(&self, source: &ArchiveSource, dest: &DestDir) -> Result<ExtractionPlan> {
        ExtractionPlan::scan(source, dest, &self.config)
    }

    /// Validates and extracts `source` into `dest`.
    ///
    /// # Errors
    ///
    /// Returns a security error if any member is rejected (nothing written),
    /// or an I/O error from the write phase.
    pub fn extract(&self, source: &ArchiveSource, dest: &DestDir) -> Result<ExtractionReport> {
        self.extract_with_progress(source, dest, &mut NoopProgress)
    }

    /// Like [`extract`](Self::extract), reporting progress during the write
    /// phase.
    ///
    /// # Errors
    ///
    /// See [`extract`](Self::extract).
    pub fn extract_with_progress(
        &self,
        source: &ArchiveSource,
        dest: &DestDir,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        let start = Instant::now();
        info!("Extracting {} into {}", source, dest.as_path().display());

        let plan = self.plan(source, dest).inspect_err(|e| {
            warn!("Refusing to extract {}: {}", source, e);
        })?;

        let mut report = write_plan(source, &plan, dest, &self.config, progress)?;
        report.duration = start.elapsed();

        info!(
            "Extracted {} files, {} directories, {} links ({} bytes) in {:?}",
            report.files_extracted,
            report.directories_created,
            report.symlinks_created + report.hardlinks_created,
            report.bytes_written,
            report.duration
        );

        Ok(report)
    }
}
