//! Permission bit handling.

use std::path::Path;

use crate::Result;

/// Keeps the rwx bits of a tar mode and drops setuid, setgid and sticky.
#[must_use]
pub const fn sanitize_mode(mode: u32) -> u32 {
    mode & 0o777
}

/// Applies `mode` to `path`. No-op on platforms without Unix permissions.
///
/// # Errors
///
/// Returns an error if the permissions cannot be set.
#[cfg(unix)]
pub fn apply_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    Ok(())
}

/// Applies `mode` to `path`. No-op on platforms without Unix permissions.
#[cfg(not(unix))]
pub fn apply_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
