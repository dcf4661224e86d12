//! Symlink escape detection.
//!
//! A valid symlink can still be abused: once `a -> /etc` (or `a -> ..` in a
//! nested directory) exists, writing `a/passwd` goes through it. Members are
//! therefore rejected when any of their ancestors is a symlink, whether that
//! symlink was declared earlier in the same archive or already sits in the
//! destination on disk.
//!
//! Symlink targets get the same treatment. A target is normalized lexically
//! before its containment check, which is only sound while no component the
//! target steps back out of with `..` is itself a symlink.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionError;
use crate::Result;
use crate::types::DestDir;
use crate::types::SafePath;

/// Remembers the symlink members seen so far in an archive.
#[derive(Debug, Default)]
pub struct LinkTracker {
    symlinks: HashSet<PathBuf>,
    /// Paths that an accepted symlink target leaves again through `..`.
    stepped_through: HashSet<PathBuf>,
}

impl LinkTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a validated symlink member and the route its target takes,
    /// as returned by [`LinkTracker::check_target_route`].
    pub fn record_symlink(&mut self, link: &SafePath, route: Vec<PathBuf>) {
        self.symlinks.insert(link.as_path().to_path_buf());
        self.stepped_through.extend(route);
    }

    /// Records a non-symlink member at `path`, which replaces any symlink
    /// previously declared there.
    pub fn record_other(&mut self, path: &SafePath) {
        self.symlinks.remove(path.as_path());
    }

    /// Fails if any proper ancestor of `path` is a symlink declared earlier
    /// in the archive.
    ///
    /// # Errors
    ///
    /// Returns `SymlinkEscape` naming `path`.
    pub fn check_ancestors(&self, path: &SafePath) -> Result<()> {
        if path
            .proper_ancestors()
            .any(|ancestor| self.symlinks.contains(ancestor))
        {
            return Err(ExtractionError::SymlinkEscape {
                path: path.as_path().to_path_buf(),
            });
        }
        Ok(())
    }

    /// Walks `target` from the parent of `link` one component at a time.
    ///
    /// Fails if a `..` component follows a symlink, whether the symlink was
    /// declared earlier in the archive or already exists in `dest`, and if
    /// `link` itself sits where an earlier target steps back out with `..`.
    /// On success returns the paths this target steps back out of, which
    /// must not become symlinks later in the archive.
    ///
    /// # Errors
    ///
    /// Returns `SymlinkEscape` naming `link`, or `Io` if metadata cannot be
    /// read.
    pub fn check_target_route(
        &self,
        link: &SafePath,
        target: &Path,
        dest: &DestDir,
    ) -> Result<Vec<PathBuf>> {
        let escape = || ExtractionError::SymlinkEscape {
            path: link.as_path().to_path_buf(),
        };

        if self.stepped_through.contains(link.as_path()) {
            return Err(escape());
        }

        let start = link.as_path().parent().unwrap_or_else(|| Path::new(""));
        let components: Vec<Component<'_>> =
            start.components().chain(target.components()).collect();

        let mut cursor = PathBuf::new();
        let mut walked = Vec::new();
        let mut route = Vec::new();
        let mut crossed_symlink = false;

        for (i, component) in components.iter().enumerate() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if crossed_symlink || !cursor.pop() {
                        return Err(escape());
                    }
                    route.append(&mut walked);
                }
                Component::Normal(name) => {
                    cursor.push(name);
                    if i + 1 < components.len() {
                        if self.symlinks.contains(&cursor)
                            || is_symlink_on_disk(&cursor, dest)?
                        {
                            crossed_symlink = true;
                        }
                        walked.push(cursor.clone());
                    }
                }
                Component::RootDir | Component::Prefix(_) => return Err(escape()),
            }
        }

        Ok(route)
    }

    /// Number of symlinks currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symlinks.len()
    }

    /// Returns `true` if no symlink has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symlinks.is_empty()
    }
}

fn is_symlink_on_disk(path: &Path, dest: &DestDir) -> Result<bool> {
    if !dest.exists() {
        return Ok(false);
    }
    match fs::symlink_metadata(dest.as_path().join(path)) {
        Ok(metadata) => Ok(metadata.file_type().is_symlink()),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            Ok(false)
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Fails if a proper ancestor of `path` already exists in `dest` as a
/// symlink.
///
/// Walks from the destination downwards and stops at the first missing
/// component. Does nothing when the destination does not exist yet.
///
/// # Errors
///
/// Returns `SymlinkEscape` naming `path`, or `Io` if metadata cannot be read.
pub fn verify_parent_not_symlink(path: &SafePath, dest: &DestDir) -> Result<()> {
    if !dest.exists() {
        return Ok(());
    }

    for ancestor in path.proper_ancestors() {
        let on_disk = dest.as_path().join(ancestor);
        match fs::symlink_metadata(&on_disk) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                return Err(ExtractionError::SymlinkEscape {
                    path: path.as_path().to_path_buf(),
                });
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(ExtractionError::Io(e)),
        }
    }

    Ok(())
}
