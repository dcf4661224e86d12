//! Error types for archive extraction operations.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Errors that can occur while scanning or extracting an archive.
///
/// Every security variant is raised during the scan phase, before the
/// destination directory is touched. Only `Io` can surface once writing has
/// started.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive is corrupted, truncated, or changed between scan and write.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// A member path resolves outside the destination directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The member path as declared in the archive.
        path: PathBuf,
    },

    /// Symlink target resolves outside the destination directory, or a
    /// member would be written through a symlink.
    #[error("symlink target outside extraction directory: {path}")]
    SymlinkEscape {
        /// The offending member path.
        path: PathBuf,
    },

    /// Hardlink target resolves outside the destination directory.
    #[error("hardlink target outside extraction directory: {path}")]
    HardlinkEscape {
        /// The hardlink member path.
        path: PathBuf,
    },

    /// Operation not permitted by the extraction policy.
    #[error("operation denied by security policy: {reason}")]
    SecurityViolation {
        /// Reason for the violation.
        reason: String,
    },
}

impl ExtractionError {
    /// Returns `true` if this error represents a rejected archive member.
    ///
    /// # Examples
    ///
    /// ```
    /// use targuard_core::ExtractionError;
    /// use std::path::PathBuf;
    ///
    /// let err = ExtractionError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = ExtractionError::InvalidArchive("truncated".into());
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. }
                | Self::SymlinkEscape { .. }
                | Self::HardlinkEscape { .. }
                | Self::SecurityViolation { .. }
        )
    }

    /// Returns the member path that triggered the error, if there is one.
    #[must_use]
    pub fn offending_path(&self) -> Option<&Path> {
        match self {
            Self::PathTraversal { path }
            | Self::SymlinkEscape { path }
            | Self::HardlinkEscape { path } => Some(path),
            _ => None,
        }
    }

    /// Returns a context string for this error, if available.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidArchive(msg) => Some(msg),
            Self::SecurityViolation { reason } => Some(reason),
            _ => None,
        }
    }
}
