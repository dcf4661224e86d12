//! Hardlink target validation.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::ExtractConfig;
use crate::ExtractionError;
use crate::Result;
use crate::types::DestDir;
use crate::types::SafePath;

/// Tracks which regular files exist (or will exist) so hardlinks can be
/// checked during the scan.
///
/// Tar hardlink targets are relative to the archive root. A hardlink is
/// accepted only if its target stays inside the destination and names a
/// regular file that was declared earlier in the archive or is already
/// present in the destination. A dangling target would otherwise only fail
/// halfway through extraction.
///
/// # Examples
///
/// ```no_run
/// use targuard_core::ExtractConfig;
/// use targuard_core::security::HardlinkTracker;
/// use targuard_core::types::DestDir;
/// use targuard_core::types::SafePath;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/out")?;
/// let config = ExtractConfig::default();
/// let mut tracker = HardlinkTracker::new();
///
/// let original = SafePath::validate(Path::new("data.bin"), &dest)?;
/// tracker.record_file(&original);
///
/// let link = SafePath::validate(Path::new("copy.bin"), &dest)?;
/// let target = tracker.validate_hardlink(&link, Path::new("data.bin"), &dest, &config)?;
/// assert_eq!(target, original);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct HardlinkTracker {
    files: HashSet<PathBuf>,
    replaced: HashSet<PathBuf>,
    links: usize,
}

impl HardlinkTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a regular file member (or a validated hardlink).
    pub fn record_file(&mut self, path: &SafePath) {
        self.files.insert(path.as_path().to_path_buf());
        self.replaced.remove(path.as_path());
    }

    /// Records that `path` is no longer a regular file (it was replaced by a
    /// directory or symlink later in the archive).
    pub fn forget(&mut self, path: &SafePath) {
        self.files.remove(path.as_path());
        self.replaced.insert(path.as_path().to_path_buf());
    }

    /// Validates a hardlink member and returns its target as a `SafePath`.
    ///
    /// # Errors
    ///
    /// - `SecurityViolation` if hardlinks are disabled or the link would
    ///   replace the destination directory itself
    /// - `HardlinkEscape` if the target leaves the destination
    /// - `InvalidArchive` if the target is neither an earlier file member
    ///   nor an existing file in the destination
    pub fn validate_hardlink(
        &mut self,
        link: &SafePath,
        target: &Path,
        dest: &DestDir,
        config: &ExtractConfig,
    ) -> Result<SafePath> {
        if !config.allowed.hardlinks {
            return Err(ExtractionError::SecurityViolation {
                reason: format!("hardlinks not allowed: {}", link.as_path().display()),
            });
        }

        if link.is_root() {
            return Err(ExtractionError::SecurityViolation {
                reason: "hardlink member resolves to the destination directory".into(),
            });
        }

        if target.is_absolute() {
            return Err(ExtractionError::HardlinkEscape {
                path: link.as_path().to_path_buf(),
            });
        }

        let safe_target = SafePath::validate(target, dest).map_err(|e| match e {
            ExtractionError::PathTraversal { .. } => ExtractionError::HardlinkEscape {
                path: link.as_path().to_path_buf(),
            },
            other => other,
        })?;

        if safe_target == *link {
            return Err(ExtractionError::InvalidArchive(format!(
                "hardlink {} points to itself",
                link.as_path().display()
            )));
        }

        let known = self.files.contains(safe_target.as_path())
            || (!self.replaced.contains(safe_target.as_path()) && exists_as_file(dest, &safe_target));
        if !known {
            return Err(ExtractionError::InvalidArchive(format!(
                "hardlink {} points to missing file {}",
                link.as_path().display(),
                target.display()
            )));
        }

        self.links += 1;
        self.record_file(link);

        Ok(safe_target)
    }

    /// Number of hardlinks validated so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.links
    }
}

fn exists_as_file(dest: &DestDir, path: &SafePath) -> bool {
    fs::symlink_metadata(dest.join(path)).is_ok_and(|m| m.file_type().is_file())
}
