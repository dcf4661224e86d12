//! Attack scenarios against full extraction.
//!
//! Every test builds a malicious archive, extracts it, and checks both the
//! error and that nothing was written.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod hardlink_attack;
mod path_traversal;
mod symlink_escape;

use std::path::Path;

use targuard_core::ExtractConfig;
use targuard_core::ExtractionError;
use targuard_core::ExtractionReport;
use targuard_core::extract_bytes;
use walkdir::WalkDir;

pub fn extract(archive: Vec<u8>, dest: &Path) -> Result<ExtractionReport, ExtractionError> {
    extract_bytes(archive, dest, &ExtractConfig::default())
}

pub fn extract_with(
    archive: Vec<u8>,
    dest: &Path,
    config: &ExtractConfig,
) -> Result<ExtractionReport, ExtractionError> {
    extract_bytes(archive, dest, config)
}

/// Number of filesystem entries below `root` (0 if it does not exist).
pub fn entry_count(root: &Path) -> usize {
    if !root.exists() {
        return 0;
    }
    WalkDir::new(root).min_depth(1).into_iter().count()
}
