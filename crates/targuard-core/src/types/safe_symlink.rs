//! Validated symlink type.

use crate::ExtractConfig;
use crate::ExtractionError;
use crate::Result;
use crate::security::path::has_null_bytes;
use crate::security::path::is_within_directory;
use std::path::Path;
use std::path::PathBuf;

use super::DestDir;
use super::SafePath;

/// A symlink member whose target stays inside the destination.
///
/// The target is resolved against the link's parent directory, the way the
/// operating system resolves it, and normalized lexically before the
/// containment check.
///
/// # Examples
///
/// ```no_run
/// use targuard_core::ExtractConfig;
/// use targuard_core::types::DestDir;
/// use targuard_core::types::SafePath;
/// use targuard_core::types::SafeSymlink;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/out")?;
/// let config = ExtractConfig::default();
///
/// let link = SafePath::validate(Path::new("dir/link"), &dest)?;
/// let symlink = SafeSymlink::validate(&link, Path::new("../file.txt"), &dest, &config)?;
/// assert_eq!(symlink.target_path(), Path::new("../file.txt"));
///
/// let escaping = Path::new("../../etc/passwd");
/// assert!(SafeSymlink::validate(&link, escaping, &dest, &config).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeSymlink {
    link: SafePath,
    target: PathBuf,
}

impl SafeSymlink {
    /// Validates a symlink member.
    ///
    /// # Errors
    ///
    /// - `SecurityViolation` if symlinks are disabled, unsupported on this
    ///   platform, the target is empty or contains a null byte, or the link
    ///   would replace the destination directory itself
    /// - `SymlinkEscape` if the target is absolute or resolves outside `dest`
    pub fn validate(
        link: &SafePath,
        target: &Path,
        dest: &DestDir,
        config: &ExtractConfig,
    ) -> Result<Self> {
        if !config.allowed.symlinks {
            return Err(ExtractionError::SecurityViolation {
                reason: format!("symlinks not allowed: {}", link.as_path().display()),
            });
        }

        if cfg!(not(unix)) {
            return Err(ExtractionError::SecurityViolation {
                reason: "symlinks are not supported on this platform".into(),
            });
        }

        if link.is_root() {
            return Err(ExtractionError::SecurityViolation {
                reason: "symlink member resolves to the destination directory".into(),
            });
        }

        if target.as_os_str().is_empty() || has_null_bytes(target) {
            return Err(ExtractionError::SecurityViolation {
                reason: format!("invalid symlink target for {}", link.as_path().display()),
            });
        }

        if target.is_absolute() {
            return Err(ExtractionError::SymlinkEscape {
                path: link.as_path().to_path_buf(),
            });
        }

        let link_parent = link.as_path().parent().unwrap_or_else(|| Path::new(""));
        let resolved = dest.as_path().join(link_parent).join(target);

        if !is_within_directory(dest.as_path(), &resolved) {
            return Err(ExtractionError::SymlinkEscape {
                path: link.as_path().to_path_buf(),
            });
        }

        Ok(Self {
            link: link.clone(),
            target: target.to_path_buf(),
        })
    }

    /// Returns the validated link path.
    #[inline]
    #[must_use]
    pub fn link(&self) -> &SafePath {
        &self.link
    }

    /// Returns the target exactly as it will be written into the link.
    #[inline]
    #[must_use]
    pub fn target_path(&self) -> &Path {
        &self.target
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dest() -> (TempDir, DestDir) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("failed to create dest");
        (temp, dest)
    }

    fn link(path: &str, dest: &DestDir) -> SafePath {
        SafePath::validate(Path::new(path), dest).expect("link path should be valid")
    }

    #[test]
    #[cfg(unix)]
    fn test_safe_symlink_valid_internal() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();

        let symlink = SafeSymlink::validate(
            &link("dir/link", &dest),
            Path::new("../file.txt"),
            &dest,
            &config,
        )
        .expect("symlink should be valid");
        assert_eq!(symlink.link().as_path(), Path::new("dir/link"));
        assert_eq!(symlink.target_path(), Path::new("../file.txt"));
    }

    #[test]
    fn test_safe_symlink_reject_when_disabled() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::strict();

        let result =
            SafeSymlink::validate(&link("link", &dest), Path::new("target.txt"), &dest, &config);
        assert!(matches!(
            result,
            Err(ExtractionError::SecurityViolation { .. })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_safe_symlink_reject_absolute_target() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();

        let result =
            SafeSymlink::validate(&link("link", &dest), Path::new("/etc/passwd"), &dest, &config);
        assert!(matches!(result, Err(ExtractionError::SymlinkEscape { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_safe_symlink_reject_escaping_target() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();

        for target in ["../outside", "a/../../outside", "../../../../../etc/passwd"] {
            let result =
                SafeSymlink::validate(&link("link", &dest), Path::new(target), &dest, &config);
            assert!(
                matches!(result, Err(ExtractionError::SymlinkEscape { .. })),
                "target should escape: {target}"
            );
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_safe_symlink_nested_parent_refs_within_dest() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();

        let result = SafeSymlink::validate(
            &link("a/b/c/link", &dest),
            Path::new("../../x.txt"),
            &dest,
            &config,
        );
        assert!(result.is_ok());
    }

    #[test]
    #[cfg(unix)]
    fn test_safe_symlink_reject_root_link() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();

        let result =
            SafeSymlink::validate(&link(".", &dest), Path::new("target"), &dest, &config);
        assert!(matches!(
            result,
            Err(ExtractionError::SecurityViolation { .. })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_safe_symlink_reject_empty_target() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();

        let result = SafeSymlink::validate(&link("link", &dest), Path::new(""), &dest, &config);
        assert!(matches!(
            result,
            Err(ExtractionError::SecurityViolation { .. })
        ));
    }
}
