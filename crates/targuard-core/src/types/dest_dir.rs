//! Resolved destination directory type.

use crate::ExtractionError;
use crate::Result;
use crate::security::path::has_null_bytes;
use crate::security::path::normalize;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use super::SafePath;

/// The directory an archive is extracted into, as an absolute path.
///
/// Relative inputs are resolved against the current working directory.
/// An existing directory is canonicalized; a missing one is normalized
/// lexically and only created once the archive has passed validation.
///
/// # Examples
///
/// ```no_run
/// use targuard_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("out")?;
/// assert!(dest.as_path().is_absolute());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Resolves `path` into a destination directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path is empty or contains a null byte
    /// - The current directory cannot be determined
    /// - The path exists and is not a directory
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if has_null_bytes(path) {
            return Err(ExtractionError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "destination path contains null byte",
            )));
        }

        let absolute = std::path::absolute(path)?;

        match fs::metadata(&absolute) {
            Ok(metadata) if metadata.is_dir() => {
                let canonical = absolute.canonicalize().map_err(|e| {
                    ExtractionError::Io(io::Error::new(
                        e.kind(),
                        format!("failed to canonicalize path {}: {e}", absolute.display()),
                    ))
                })?;
                Ok(Self(canonical))
            }
            Ok(_) => Err(ExtractionError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path is not a directory: {}", absolute.display()),
            ))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self(normalize(&absolute))),
            Err(e) => Err(ExtractionError::Io(e)),
        }
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a validated member path onto this directory.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &SafePath) -> PathBuf {
        self.0.join(safe_path.as_path())
    }

    /// Returns `true` if the directory is present on disk.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.0.is_dir()
    }

    /// Creates the directory (and missing parents) if it is not there yet.
    pub(crate) fn ensure_exists(&self) -> Result<()> {
        fs::create_dir_all(&self.0)?;
        Ok(())
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dest_dir_existing() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("dest should be valid");
        assert!(dest.as_path().is_absolute());
        assert!(dest.exists());
        assert_eq!(dest.as_path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_dest_dir_missing_is_not_created() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let missing = temp.path().join("a").join("b");
        let dest = DestDir::new(&missing).expect("missing dest should resolve");

        assert!(dest.as_path().is_absolute());
        assert!(!dest.exists());
        assert!(!missing.exists(), "resolving must not create the directory");

        dest.ensure_exists().unwrap();
        assert!(missing.is_dir());
    }

    #[test]
    fn test_dest_dir_missing_is_normalized() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path().join("x").join("..").join("out")).unwrap();
        assert!(dest.as_path().ends_with("out"));
        assert!(!dest.as_path().to_string_lossy().contains(".."));
    }

    #[test]
    fn test_dest_dir_not_a_directory() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let file_path = temp.path().join("file.txt");
        fs::write(&file_path, "test").expect("failed to write file");

        let result = DestDir::new(file_path);
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn test_dest_dir_relative_becomes_absolute() {
        let dest = DestDir::new("relative/output").unwrap();
        assert!(dest.as_path().is_absolute());
        assert!(dest.as_path().ends_with("relative/output"));
    }

    #[test]
    fn test_dest_dir_empty_path_rejected() {
        assert!(DestDir::new("").is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_dest_dir_with_symlink_resolves() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let real_dir = temp.path().join("real");
        fs::create_dir(&real_dir).expect("failed to create real dir");
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&real_dir, &link).expect("failed to create symlink");

        let dest = DestDir::new(&link).expect("should create from symlink");
        assert_eq!(dest.as_path(), real_dir.canonicalize().unwrap());
    }
}
