//! Member validation orchestrator.
//!
//! `MemberValidator` runs every check a single archive member must pass and
//! carries the state that spans members (declared symlinks, known files for
//! hardlink targets, and what each path will hold once written).

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::ExtractConfig;
use crate::ExtractionError;
use crate::Result;
use crate::security::hardlink::HardlinkTracker;
use crate::security::permissions::sanitize_mode;
use crate::security::symlink::LinkTracker;
use crate::security::symlink::verify_parent_not_symlink;
use crate::types::DestDir;
use crate::types::Member;
use crate::types::MemberKind;
use crate::types::SafePath;
use crate::types::SafeSymlink;

/// A member that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedMember {
    /// Validated path relative to the destination.
    pub safe_path: SafePath,

    /// Validated member kind.
    pub kind: ValidatedKind,

    /// Mode with special bits removed.
    pub mode: Option<u32>,
}

/// Validated member kinds.
#[derive(Debug, Clone)]
pub enum ValidatedKind {
    /// Regular file.
    File,

    /// Directory.
    Directory,

    /// Symlink with a contained target.
    Symlink(SafeSymlink),

    /// Hardlink to a file that exists before the link is written.
    Hardlink {
        /// Target path relative to the destination.
        target: SafePath,
    },

    /// Special member (fifo, device, ...) that is not extracted.
    Skipped(u8),
}

/// What a path holds after the members validated so far are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Planned {
    Directory,
    NonDirectory,
}

/// Validates archive members one at a time, in archive order.
///
/// # Examples
///
/// ```no_run
/// use targuard_core::ExtractConfig;
/// use targuard_core::security::MemberValidator;
/// use targuard_core::types::DestDir;
/// use targuard_core::types::Member;
/// use targuard_core::types::MemberKind;
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/out")?;
/// let config = ExtractConfig::default();
/// let mut validator = MemberValidator::new(&config, &dest);
///
/// let member = Member {
///     path: PathBuf::from("docs/readme.txt"),
///     kind: MemberKind::File,
///     size: 12,
///     mode: Some(0o644),
/// };
/// let validated = validator.validate_member(&member)?;
/// assert_eq!(validated.mode, Some(0o644));
/// # Ok(())
/// # }
/// ```
pub struct MemberValidator<'a> {
    config: &'a ExtractConfig,
    dest: &'a DestDir,
    links: LinkTracker,
    hardlinks: HardlinkTracker,
    planned: HashMap<PathBuf, Planned>,
    members_validated: usize,
    total_bytes: u64,
}

impl<'a> MemberValidator<'a> {
    /// Creates a validator for extraction into `dest`.
    #[must_use]
    pub fn new(config: &'a ExtractConfig, dest: &'a DestDir) -> Self {
        Self {
            config,
            dest,
            links: LinkTracker::new(),
            hardlinks: HardlinkTracker::new(),
            planned: HashMap::new(),
            members_validated: 0,
            total_bytes: 0,
        }
    }

    /// Validates one member.
    ///
    /// Checks, in order:
    /// 1. path containment (`PathTraversal`, `SecurityViolation` for NUL)
    /// 2. the member is not the destination itself unless it is a directory
    /// 3. no ancestor is a symlink, in the archive or on disk
    ///    (`SymlinkEscape`)
    /// 4. the member fits what earlier members of the archive left at its
    ///    path and ancestors (`InvalidArchive`)
    /// 5. the existing entry on disk may be replaced (`Io` with
    ///    `AlreadyExists` for existing directories, non-directory ancestors,
    ///    or when overwriting is off)
    /// 6. kind-specific checks for symlinks and hardlinks
    ///
    /// # Errors
    ///
    /// Returns the first failed check.
    pub fn validate_member(&mut self, member: &Member) -> Result<ValidatedMember> {
        let safe_path = SafePath::validate(&member.path, self.dest)?;

        if safe_path.is_root() && !member.kind.is_directory() {
            return Err(ExtractionError::SecurityViolation {
                reason: format!(
                    "{} member {} resolves to the destination directory",
                    member.kind.label(),
                    member.path.display()
                ),
            });
        }

        self.links.check_ancestors(&safe_path)?;
        verify_parent_not_symlink(&safe_path, self.dest)?;
        self.check_planned(&safe_path, &member.kind)?;
        self.check_collision(&safe_path, &member.kind)?;

        let kind = match &member.kind {
            MemberKind::File => {
                self.hardlinks.record_file(&safe_path);
                self.links.record_other(&safe_path);
                self.total_bytes = self.total_bytes.saturating_add(member.size);
                ValidatedKind::File
            }
            MemberKind::Directory => {
                self.hardlinks.forget(&safe_path);
                self.links.record_other(&safe_path);
                ValidatedKind::Directory
            }
            MemberKind::Symlink { target } => {
                let symlink = SafeSymlink::validate(&safe_path, target, self.dest, self.config)?;
                let route = self.links.check_target_route(&safe_path, target, self.dest)?;
                self.hardlinks.forget(&safe_path);
                self.links.record_symlink(&safe_path, route);
                ValidatedKind::Symlink(symlink)
            }
            MemberKind::Hardlink { target } => {
                let target = self.hardlinks.validate_hardlink(
                    &safe_path,
                    target,
                    self.dest,
                    self.config,
                )?;
                self.links
                    .check_ancestors(&target)
                    .and_then(|()| verify_parent_not_symlink(&target, self.dest))
                    .map_err(|_| ExtractionError::HardlinkEscape {
                        path: safe_path.as_path().to_path_buf(),
                    })?;
                self.links.record_other(&safe_path);
                ValidatedKind::Hardlink { target }
            }
            MemberKind::Other(type_byte) => ValidatedKind::Skipped(*type_byte),
        };

        if !matches!(kind, ValidatedKind::Skipped(_)) {
            self.record_planned(&safe_path, member.kind.is_directory());
        }

        let mode = match kind {
            ValidatedKind::File | ValidatedKind::Directory => member.mode.map(sanitize_mode),
            _ => None,
        };

        self.members_validated += 1;

        Ok(ValidatedMember {
            safe_path,
            kind,
            mode,
        })
    }

    fn check_planned(&self, path: &SafePath, kind: &MemberKind) -> Result<()> {
        if path.is_root() || matches!(kind, MemberKind::Other(_)) {
            return Ok(());
        }

        if let Some(ancestor) = path
            .proper_ancestors()
            .find(|a| self.planned.get(*a) == Some(&Planned::NonDirectory))
        {
            return Err(ExtractionError::InvalidArchive(format!(
                "{} is below non-directory member {}",
                path.as_path().display(),
                ancestor.display()
            )));
        }

        match (self.planned.get(path.as_path()), kind.is_directory()) {
            (Some(Planned::Directory), false) => Err(ExtractionError::InvalidArchive(format!(
                "{} {} replaces a directory from the same archive",
                kind.label(),
                path.as_path().display()
            ))),
            (Some(Planned::NonDirectory), _) if !self.config.overwrite => {
                Err(ExtractionError::Io(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} appears more than once", path.as_path().display()),
                )))
            }
            _ => Ok(()),
        }
    }

    fn record_planned(&mut self, path: &SafePath, is_directory: bool) {
        if path.is_root() {
            return;
        }
        for ancestor in path.proper_ancestors() {
            self.planned
                .insert(ancestor.to_path_buf(), Planned::Directory);
        }
        let planned = if is_directory {
            Planned::Directory
        } else {
            Planned::NonDirectory
        };
        self.planned.insert(path.as_path().to_path_buf(), planned);
    }

    fn check_collision(&self, path: &SafePath, kind: &MemberKind) -> Result<()> {
        if path.is_root() || !self.dest.exists() {
            return Ok(());
        }

        // an ancestor the archive has not planned yet must be a directory on disk
        for ancestor in path.proper_ancestors() {
            if self.planned.contains_key(ancestor) {
                continue;
            }
            match fs::symlink_metadata(self.dest.as_path().join(ancestor)) {
                Ok(metadata) if !metadata.is_dir() => {
                    return Err(ExtractionError::Io(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{} exists and is not a directory", ancestor.display()),
                    )));
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => break,
                Err(e) => return Err(ExtractionError::Io(e)),
            }
        }

        let metadata = match fs::symlink_metadata(self.dest.join(path)) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(ExtractionError::Io(e)),
        };

        // existing directories are never replaced
        if metadata.is_dir() {
            if kind.is_directory() {
                return Ok(());
            }
            return Err(ExtractionError::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is an existing directory", path.as_path().display()),
            )));
        }

        if self.config.overwrite || matches!(kind, MemberKind::Other(_)) {
            return Ok(());
        }

        Err(ExtractionError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.as_path().display()),
        )))
    }

    /// Finishes validation and returns summary counts.
    #[must_use]
    pub fn finish(self) -> ValidationReport {
        ValidationReport {
            members_validated: self.members_validated,
            total_bytes: self.total_bytes,
            symlinks_tracked: self.links.len(),
            hardlinks_tracked: self.hardlinks.count(),
        }
    }
}

/// Summary of a validation pass.
#[derive(Debug)]
pub struct ValidationReport {
    /// Number of members validated
    pub members_validated: usize,

    /// Declared size of all regular files
    pub total_bytes: u64,

    /// Number of symlinks still in effect at the end of the archive
    pub symlinks_tracked: usize,

    /// Number of hardlinks validated
    pub hardlinks_tracked: usize,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_dest() -> (TempDir, DestDir) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("failed to create dest");
        (temp, dest)
    }

    fn member(path: &str, kind: MemberKind) -> Member {
        Member {
            path: PathBuf::from(path),
            kind,
            size: 0,
            mode: Some(0o644),
        }
    }

    fn file(path: &str) -> Member {
        member(path, MemberKind::File)
    }

    #[test]
    fn test_validator_new() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();
        let report = MemberValidator::new(&config, &dest).finish();
        assert_eq!(report.members_validated, 0);
        assert_eq!(report.total_bytes, 0);
        assert_eq!(report.hardlinks_tracked, 0);
    }

    #[test]
    fn test_validate_file_member() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();
        let mut validator = MemberValidator::new(&config, &dest);

        let mut m = file("a/b.txt");
        m.size = 42;
        m.mode = Some(0o4755);
        let validated = validator.validate_member(&m).unwrap();
        assert_eq!(validated.safe_path.as_path(), Path::new("a/b.txt"));
        assert!(matches!(validated.kind, ValidatedKind::File));
        assert_eq!(validated.mode, Some(0o755));

        let report = validator.finish();
        assert_eq!(report.members_validated, 1);
        assert_eq!(report.total_bytes, 42);
    }

    #[test]
    fn test_validate_traversal_rejected() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();
        let mut validator = MemberValidator::new(&config, &dest);

        let result = validator.validate_member(&file("../etc/passwd"));
        assert!(matches!(result, Err(ExtractionError::PathTraversal { .. })));
    }

    #[test]
    fn test_validate_root_directory_accepted() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();
        let mut validator = MemberValidator::new(&config, &dest);

        let validated = validator
            .validate_member(&member(".", MemberKind::Directory))
            .unwrap();
        assert!(validated.safe_path.is_root());
    }

    #[test]
    fn test_validate_root_file_rejected() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();
        let mut validator = MemberValidator::new(&config, &dest);

        let result = validator.validate_member(&file("./"));
        assert!(matches!(
            result,
            Err(ExtractionError::SecurityViolation { .. })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_validate_member_through_archive_symlink() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();
        let mut validator = MemberValidator::new(&config, &dest);

        validator
            .validate_member(&member(
                "sub/link",
                MemberKind::Symlink {
                    target: PathBuf::from(".."),
                },
            ))
            .unwrap();

        let result = validator.validate_member(&file("sub/link/escape.txt"));
        assert!(matches!(result, Err(ExtractionError::SymlinkEscape { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_validate_hardlink_through_symlink_rejected() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();
        let mut validator = MemberValidator::new(&config, &dest);

        validator.validate_member(&file("real/data")).unwrap();
        validator
            .validate_member(&member(
                "alias",
                MemberKind::Symlink {
                    target: PathBuf::from("real"),
                },
            ))
            .unwrap();

        let result = validator.validate_member(&member(
            "copy",
            MemberKind::Hardlink {
                target: PathBuf::from("alias/data"),
            },
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_special_member_skipped() {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();
        let mut validator = MemberValidator::new(&config, &dest);

        let validated = validator
            .validate_member(&member("dev/fifo", MemberKind::Other(b'6')))
            .unwrap();
        assert!(matches!(validated.kind, ValidatedKind::Skipped(b'6')));
        assert!(validated.mode.is_none());
    }

    #[test]
    fn test_validate_no_overwrite_collision() {
        let (temp, dest) = create_test_dest();
        std::fs::write(temp.path().join("exists.txt"), "old").unwrap();
        std::fs::create_dir(temp.path().join("dir")).unwrap();
        let config = ExtractConfig {
            overwrite: false,
            ..ExtractConfig::default()
        };
        let mut validator = MemberValidator::new(&config, &dest);

        let result = validator.validate_member(&file("exists.txt"));
        match result {
            Err(ExtractionError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::AlreadyExists),
            other => panic!("expected AlreadyExists, got {other:?}"),
        }

        assert!(
            validator
                .validate_member(&member("dir", MemberKind::Directory))
                .is_ok()
        );
        assert!(validator.validate_member(&file("new.txt")).is_ok());
    }

    #[test]
    fn test_validate_file_over_existing_directory_rejected() {
        let (temp, dest) = create_test_dest();
        std::fs::create_dir(temp.path().join("data")).unwrap();
        let config = ExtractConfig::default();
        let mut validator = MemberValidator::new(&config, &dest);

        let result = validator.validate_member(&file("data"));
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }
}
