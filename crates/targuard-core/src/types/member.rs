//! Archive member description.

use std::path::PathBuf;

/// Type of a member in an archive.
///
/// Link targets are taken verbatim from the archive header and have NOT
/// been validated.
///
/// # Examples
///
/// ```
/// use targuard_core::types::MemberKind;
/// use std::path::PathBuf;
///
/// let symlink = MemberKind::Symlink {
///     target: PathBuf::from("../target"),
/// };
/// assert!(symlink.is_link());
/// assert!(!MemberKind::File.is_link());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Regular file.
    File,

    /// Directory.
    Directory,

    /// Symbolic link.
    Symlink {
        /// The symlink target as stored in the archive.
        target: PathBuf,
    },

    /// Hard link to another member.
    Hardlink {
        /// The link target as stored in the archive, relative to the archive
        /// root.
        target: PathBuf,
    },

    /// Any other tar entry type (fifo, character or block device, ...).
    ///
    /// Carries the raw tar type flag. Such members are never extracted.
    Other(u8),
}

impl MemberKind {
    /// Returns `true` if this is a regular file.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }

    /// Returns `true` if this is a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Returns `true` for symlinks and hardlinks.
    #[must_use]
    pub const fn is_link(&self) -> bool {
        matches!(self, Self::Symlink { .. } | Self::Hardlink { .. })
    }

    /// Short lowercase label, as printed by `list`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "dir",
            Self::Symlink { .. } => "symlink",
            Self::Hardlink { .. } => "hardlink",
            Self::Other(_) => "other",
        }
    }
}

/// One entry of an archive, as declared in its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Path as stored in the archive (after GNU/PAX long-name handling).
    pub path: PathBuf,

    /// Member type and link target.
    pub kind: MemberKind,

    /// Payload size in bytes.
    pub size: u64,

    /// Permission bits from the header, if readable.
    pub mode: Option<u32>,
}
