//! Error conversion utilities for CLI.
//!
//! Converts targuard-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use targuard_core::ExtractionError;

/// Converts `ExtractionError` to user-friendly anyhow error with context.
///
/// `source` names the archive (a path or URL) in the message.
pub fn convert_extraction_error(err: ExtractionError, source: &str) -> anyhow::Error {
    match err {
        ExtractionError::PathTraversal { path } => {
            anyhow!(
                "Security violation: Archive '{source}' attempted path traversal with '{}'\n\
                 HINT: This archive may be malicious. Nothing was extracted.",
                path.display()
            )
        }
        ExtractionError::SymlinkEscape { path } => {
            anyhow!(
                "Symlink rejected in '{source}': {}\n\
                 HINT: A link in this archive points outside the output directory, \
                 or a member would be written through one. Nothing was extracted.",
                path.display()
            )
        }
        ExtractionError::HardlinkEscape { path } => {
            anyhow!(
                "Hardlink rejected in '{source}': {}\n\
                 HINT: The link target is outside the output directory or not a regular file.",
                path.display()
            )
        }
        ExtractionError::SecurityViolation { reason } => {
            anyhow!(
                "Security violation in '{source}': {reason}\n\
                 HINT: Drop --no-symlinks/--no-hardlinks if this archive is trusted."
            )
        }
        ExtractionError::Io(io_err) if io_err.kind() == std::io::ErrorKind::AlreadyExists => {
            anyhow!(
                "Refusing to replace existing path while extracting '{source}': {io_err}\n\
                 HINT: Remove the existing path or drop --no-overwrite."
            )
        }
        ExtractionError::Io(io_err) => {
            anyhow!("I/O error while processing '{source}': {io_err}")
        }
        ExtractionError::InvalidArchive(reason) => {
            anyhow!(
                "Invalid archive '{source}': {reason}\n\
                 HINT: The archive may be corrupted, truncated, or not a tar/tar.gz file."
            )
        }
    }
}

/// Adds context to a core result about archive operations.
pub fn add_archive_context<T>(
    result: Result<T, ExtractionError>,
    source: impl std::fmt::Display,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_extraction_error(e, &source.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_path_traversal_error() {
        let err = ExtractionError::PathTraversal {
            path: PathBuf::from("../../../etc/passwd"),
        };
        let converted = convert_extraction_error(err, "results.tar.gz");
        let msg = format!("{converted:?}");
        assert!(msg.contains("path traversal"));
        assert!(msg.contains("results.tar.gz"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_policy_error_mentions_flags() {
        let err = ExtractionError::SecurityViolation {
            reason: "symlinks not allowed: link".into(),
        };
        let msg = format!("{:?}", convert_extraction_error(err, "a.tar"));
        assert!(msg.contains("--no-symlinks"));
    }

    #[test]
    fn test_convert_already_exists_error() {
        let err = ExtractionError::Io(io::Error::new(io::ErrorKind::AlreadyExists, "x exists"));
        let msg = format!("{:?}", convert_extraction_error(err, "a.tar"));
        assert!(msg.contains("--no-overwrite"));
    }

    #[test]
    fn test_convert_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = ExtractionError::Io(io_err);
        let converted = convert_extraction_error(err, "archive.tar.gz");
        let msg = format!("{converted:?}");
        assert!(msg.contains("I/O error"));
    }
}
