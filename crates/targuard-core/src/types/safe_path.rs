//! Validated member path type.

use crate::ExtractionError;
use crate::Result;
use crate::security::path::has_null_bytes;
use crate::security::path::is_within_directory;
use crate::security::path::normalize;
use std::path::Path;
use std::path::PathBuf;

use super::DestDir;

/// A member path proven to resolve inside a destination directory.
///
/// The stored path is relative to the destination and lexically normalized:
/// `a/./b/../c.txt` is stored as `a/c.txt`. An empty `SafePath` denotes the
/// destination directory itself (member paths such as `.` or `./`).
///
/// # Security Properties
///
/// - Can ONLY be constructed through validation
/// - NO `From<PathBuf>` implementation
/// - `dest.join(&safe)` is always the destination or one of its descendants
///
/// # Examples
///
/// ```no_run
/// use targuard_core::types::DestDir;
/// use targuard_core::types::SafePath;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/out")?;
///
/// let safe = SafePath::validate(Path::new("a/../b.txt"), &dest)?;
/// assert_eq!(safe.as_path(), Path::new("b.txt"));
///
/// assert!(SafePath::validate(Path::new("../escape.txt"), &dest).is_err());
/// assert!(SafePath::validate(Path::new("/etc/passwd"), &dest).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Validates `path` against `dest`.
    ///
    /// The candidate `normalize(dest / path)` must equal `dest` or lie inside
    /// it. Joining an absolute member path replaces the destination, so
    /// `/etc/passwd` is rejected like any other escape.
    ///
    /// # Errors
    ///
    /// - `ExtractionError::PathTraversal` if the candidate leaves `dest`
    /// - `ExtractionError::SecurityViolation` if the path contains a null byte
    pub fn validate(path: &Path, dest: &DestDir) -> Result<Self> {
        if has_null_bytes(path) {
            return Err(ExtractionError::SecurityViolation {
                reason: format!("path contains null bytes: {}", path.display()),
            });
        }

        let candidate = normalize(&dest.as_path().join(path));
        if !is_within_directory(dest.as_path(), &candidate) {
            return Err(ExtractionError::PathTraversal {
                path: path.to_path_buf(),
            });
        }

        let relative = candidate
            .strip_prefix(dest.as_path())
            .map_err(|_| ExtractionError::PathTraversal {
                path: path.to_path_buf(),
            })?;

        Ok(Self(relative.to_path_buf()))
    }

    /// Returns `true` if this path denotes the destination directory itself.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    /// Iterates over the proper ancestors of this path, closest to the root
    /// first, excluding the empty root path.
    pub(crate) fn proper_ancestors(&self) -> impl Iterator<Item = &Path> {
        let mut ancestors: Vec<&Path> = self
            .0
            .ancestors()
            .skip(1)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        ancestors.reverse();
        ancestors.into_iter()
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}
