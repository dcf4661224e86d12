//! Scan phase: validate every member before anything is written.

use tracing::debug;

use crate::ExtractConfig;
use crate::Result;
use crate::formats::ArchiveSource;
use crate::formats::reader::for_each_member;
use crate::security::MemberValidator;
use crate::security::ValidatedKind;
use crate::security::ValidatedMember;
use crate::types::DestDir;
use crate::types::Member;

/// One member of a scanned archive.
#[derive(Debug, Clone)]
pub struct PlannedMember {
    /// Position in the archive, counting from zero.
    pub index: usize,

    /// The member as declared in the archive.
    pub member: Member,

    /// The validated form that will be written.
    pub validated: ValidatedMember,
}

/// Member counts of a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    /// Regular files
    pub files: usize,
    /// Directories, the destination root included
    pub directories: usize,
    /// Symlinks
    pub symlinks: usize,
    /// Hardlinks
    pub hardlinks: usize,
    /// Members that will not be extracted
    pub skipped: usize,
    /// Declared size of all regular files
    pub total_bytes: u64,
}

impl PlanSummary {
    fn record(&mut self, kind: &ValidatedKind, size: u64) {
        match kind {
            ValidatedKind::File => {
                self.files += 1;
                self.total_bytes = self.total_bytes.saturating_add(size);
            }
            ValidatedKind::Directory => self.directories += 1,
            ValidatedKind::Symlink(_) => self.symlinks += 1,
            ValidatedKind::Hardlink { .. } => self.hardlinks += 1,
            ValidatedKind::Skipped(_) => self.skipped += 1,
        }
    }
}

/// The outcome of a successful scan: every member of the archive, validated,
/// in archive order.
///
/// A plan only exists if the whole archive passed validation. Building one
/// never touches the destination.
///
/// # Examples
///
/// ```no_run
/// use targuard_core::ExtractConfig;
/// use targuard_core::extraction::ExtractionPlan;
/// use targuard_core::formats::ArchiveSource;
/// use targuard_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = ArchiveSource::from_path("results.tar.gz");
/// let dest = DestDir::new("analysis")?;
/// let plan = ExtractionPlan::scan(&source, &dest, &ExtractConfig::default())?;
/// println!("{} files to write", plan.summary().files);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionPlan {
    members: Vec<PlannedMember>,
    summary: PlanSummary,
}

impl ExtractionPlan {
    /// Reads the whole archive and validates every member against `dest`.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, or `InvalidArchive` / `Io` if
    /// the archive cannot be read.
    pub fn scan(source: &ArchiveSource, dest: &DestDir, config: &ExtractConfig) -> Result<Self> {
        let mut validator = MemberValidator::new(config, dest);
        let mut members = Vec::new();
        let mut summary = PlanSummary::default();

        for_each_member(source, |index, member, _payload| {
            let validated = validator.validate_member(&member).inspect_err(|e| {
                debug!("Rejected member {}: {}", member.path.display(), e);
            })?;

            debug!(
                "Accepted {} {} as {}",
                member.kind.label(),
                member.path.display(),
                validated.safe_path.as_path().display()
            );

            summary.record(&validated.kind, member.size);
            members.push(PlannedMember {
                index,
                member,
                validated,
            });
            Ok(())
        })?;

        let validation = validator.finish();
        debug!(
            "Scan complete: {} members, {} bytes, {} hardlinks",
            validation.members_validated, validation.total_bytes, validation.hardlinks_tracked
        );

        Ok(Self { members, summary })
    }

    /// Planned members in archive order.
    #[must_use]
    pub fn members(&self) -> &[PlannedMember] {
        &self.members
    }

    /// Member counts.
    #[must_use]
    pub const fn summary(&self) -> PlanSummary {
        self.summary
    }

    /// Number of members in the archive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` for an archive without members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
