//! Extraction policy configuration.

/// Link member types that may be extracted.
///
/// Allowed links are still validated: a symlink or hardlink whose target
/// resolves outside the destination is always rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedMembers {
    /// Extract symbolic link members.
    pub symlinks: bool,

    /// Extract hard link members.
    pub hardlinks: bool,
}

impl Default for AllowedMembers {
    fn default() -> Self {
        Self {
            symlinks: true,
            hardlinks: true,
        }
    }
}

/// Extraction policy.
///
/// The defaults mirror what a plain `tar -xzf` produces for a well-formed
/// archive: links are recreated, permission bits are kept, existing files
/// are replaced.
///
/// # Examples
///
/// ```
/// use targuard_core::ExtractConfig;
///
/// let config = ExtractConfig::default();
/// assert!(config.preserve_permissions);
///
/// let strict = ExtractConfig::strict();
/// assert!(!strict.allowed.symlinks);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Link member types that may be extracted.
    pub allowed: AllowedMembers,

    /// Apply the archive's permission bits (`mode & 0o777`) on Unix.
    pub preserve_permissions: bool,

    /// Replace files that already exist in the destination.
    ///
    /// When `false`, a member that collides with an existing non-directory
    /// entry fails the scan with `io::ErrorKind::AlreadyExists`.
    pub overwrite: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            allowed: AllowedMembers::default(),
            preserve_permissions: true,
            overwrite: true,
        }
    }
}

impl ExtractConfig {
    /// Creates a configuration that refuses every link member.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            allowed: AllowedMembers {
                symlinks: false,
                hardlinks: false,
            },
            ..Default::default()
        }
    }
}
