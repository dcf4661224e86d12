//! High-level public API for archive extraction and inspection.

use std::path::Path;

use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::extraction::Extractor;
use crate::formats::ArchiveSource;
use crate::inspection;
use crate::inspection::ArchiveManifest;
use crate::inspection::VerificationReport;
use crate::types::DestDir;

/// Extracts a tar or tar.gz archive file into `output_dir`.
///
/// Every member is validated first; if any member would land outside
/// `output_dir`, nothing is written and the error names that member.
///
/// # Errors
///
/// Returns an error if:
/// - the archive cannot be opened or parsed
/// - a member fails validation (`PathTraversal`, `SymlinkEscape`, ...)
/// - writing fails
///
/// # Examples
///
/// ```no_run
/// use targuard_core::ExtractConfig;
/// use targuard_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractConfig::default();
/// let report = extract_archive("results.tar.gz", "analysis", &config)?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    config: &ExtractConfig,
) -> Result<ExtractionReport> {
    let source = ArchiveSource::from_path(archive_path.as_ref());
    let dest = DestDir::new(output_dir)?;
    Extractor::new(config.clone()).extract(&source, &dest)
}

/// Like [`extract_archive`], reporting progress while writing.
///
/// # Errors
///
/// See [`extract_archive`].
pub fn extract_archive_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    config: &ExtractConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let source = ArchiveSource::from_path(archive_path.as_ref());
    let dest = DestDir::new(output_dir)?;
    Extractor::new(config.clone()).extract_with_progress(&source, &dest, progress)
}

/// Extracts an archive held in memory, e.g. a downloaded response body.
///
/// # Errors
///
/// See [`extract_archive`].
///
/// # Examples
///
/// ```no_run
/// use targuard_core::ExtractConfig;
/// use targuard_core::extract_bytes;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let body: Vec<u8> = std::fs::read("analysis.tar.gz")?;
/// extract_bytes(body, "analysis", &ExtractConfig::default())?;
/// # Ok(())
/// # }
/// ```
pub fn extract_bytes<Q: AsRef<Path>>(
    bytes: Vec<u8>,
    output_dir: Q,
    config: &ExtractConfig,
) -> Result<ExtractionReport> {
    let source = ArchiveSource::from_bytes(bytes);
    let dest = DestDir::new(output_dir)?;
    Extractor::new(config.clone()).extract(&source, &dest)
}

/// Lists the members of an archive file without extracting.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or parsed.
pub fn list_archive<P: AsRef<Path>>(archive_path: P) -> Result<ArchiveManifest> {
    inspection::list_members(&ArchiveSource::from_path(archive_path.as_ref()))
}

/// Checks whether an archive file could be extracted safely into
/// `output_dir`, without writing anything.
///
/// # Errors
///
/// Returns an error if the archive cannot be read. Security violations are
/// reported in the returned [`VerificationReport`].
pub fn verify_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    config: &ExtractConfig,
) -> Result<VerificationReport> {
    let source = ArchiveSource::from_path(archive_path.as_ref());
    let dest = DestDir::new(output_dir)?;
    inspection::verify(&source, &dest, config)
}
