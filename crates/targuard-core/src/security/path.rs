//! Path normalization and containment checks.
//!
//! Containment is decided on path components, never on string prefixes:
//! `/a/b` contains `/a/b/c` but not `/a/bc`.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Normalizes a path lexically, without touching the filesystem.
///
/// `.` components are dropped and `..` removes the preceding normal
/// component. A `..` directly under the root stays at the root, and leading
/// `..` components of a relative path are kept.
///
/// # Examples
///
/// ```
/// use targuard_core::security::normalize;
/// use std::path::Path;
///
/// assert_eq!(normalize(Path::new("/out/a/../b.txt")), Path::new("/out/b.txt"));
/// assert_eq!(normalize(Path::new("/out/../../etc")), Path::new("/etc"));
/// assert_eq!(normalize(Path::new("./a/./b")), Path::new("a/b"));
/// assert_eq!(normalize(Path::new("../x")), Path::new("../x"));
/// ```
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
        }
    }

    normalized
}

/// Returns `true` if `target` is `directory` itself or lies inside it.
///
/// Both paths are normalized before comparison, and the comparison is done
/// component by component.
///
/// # Examples
///
/// ```
/// use targuard_core::security::is_within_directory;
/// use std::path::Path;
///
/// assert!(is_within_directory(Path::new("/a/b"), Path::new("/a/b")));
/// assert!(is_within_directory(Path::new("/a/b"), Path::new("/a/b/c/d")));
/// assert!(!is_within_directory(Path::new("/a/b"), Path::new("/a/bc")));
/// assert!(!is_within_directory(Path::new("/a/b"), Path::new("/a/b/../c")));
/// ```
#[must_use]
pub fn is_within_directory(directory: &Path, target: &Path) -> bool {
    normalize(target).starts_with(normalize(directory))
}

/// Checks if a path contains null bytes.
#[cfg(unix)]
pub(crate) fn has_null_bytes(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().contains(&b'\0')
}

/// Checks if a path contains null bytes.
#[cfg(not(unix))]
pub(crate) fn has_null_bytes(path: &Path) -> bool {
    path.to_str().is_none_or(|s| s.contains('\0'))
}
