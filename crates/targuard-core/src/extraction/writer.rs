//! Write phase: materialize a validated plan on disk.

use std::fs;
use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::warn;

use crate::ExtractConfig;
use crate::ExtractionError;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::extraction::plan::ExtractionPlan;
use crate::extraction::plan::PlannedMember;
use crate::formats::ArchiveSource;
use crate::formats::reader::for_each_member;
use crate::security::ValidatedKind;
use crate::security::permissions::apply_mode;
use crate::types::DestDir;
use crate::types::SafePath;
use crate::types::SafeSymlink;

/// Re-reads `source` and writes every planned member into `dest`.
///
/// Each member read back must match the planned member at the same index,
/// otherwise the source changed since the scan and extraction stops.
/// Directory permissions are applied last, deepest first, so a read-only
/// directory does not block writing its children.
pub(crate) fn write_plan(
    source: &ArchiveSource,
    plan: &ExtractionPlan,
    dest: &DestDir,
    config: &ExtractConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    dest.ensure_exists()?;

    let mut report = ExtractionReport::new();
    let mut buffer = CopyBuffer::new();
    let mut directory_modes: Vec<(PathBuf, u32)> = Vec::new();
    let total = plan.len();
    let mut planned_members = plan.members().iter();

    for_each_member(source, |index, member, payload| {
        let planned = planned_members
            .next()
            .filter(|p| p.index == index && p.member == member)
            .ok_or_else(archive_changed)?;
        let path = planned.validated.safe_path.as_path();

        progress.on_member_start(path, total, index + 1);

        match &planned.validated.kind {
            ValidatedKind::File => {
                let written = write_file(
                    payload,
                    planned,
                    dest,
                    config,
                    &mut buffer,
                    &mut *progress,
                )?;
                report.files_extracted += 1;
                report.bytes_written = report.bytes_written.saturating_add(written);
            }
            ValidatedKind::Directory => {
                let output_path = create_directory(&planned.validated.safe_path, dest)?;
                if !planned.validated.safe_path.is_root() {
                    report.directories_created += 1;
                    if config.preserve_permissions
                        && let Some(mode) = planned.validated.mode
                    {
                        directory_modes.push((output_path, mode));
                    }
                }
            }
            ValidatedKind::Symlink(symlink) => {
                create_symlink(symlink, dest)?;
                report.symlinks_created += 1;
            }
            ValidatedKind::Hardlink { target } => {
                create_hardlink(&planned.validated.safe_path, target, dest)?;
                report.hardlinks_created += 1;
            }
            ValidatedKind::Skipped(type_byte) => {
                let message = format!(
                    "skipped {}: unsupported member type {:?}",
                    path.display(),
                    char::from(*type_byte)
                );
                warn!("{}", message);
                report.add_warning(message);
                report.members_skipped += 1;
            }
        }

        debug!("Wrote {}", path.display());
        progress.on_member_complete(path);
        Ok(())
    })?;

    if planned_members.next().is_some() {
        return Err(archive_changed());
    }

    for (path, mode) in directory_modes.iter().rev() {
        apply_mode(path, *mode)?;
    }

    progress.on_complete();
    Ok(report)
}

fn archive_changed() -> ExtractionError {
    ExtractionError::InvalidArchive("archive changed between scan and extraction".into())
}

fn write_file(
    payload: &mut dyn Read,
    planned: &PlannedMember,
    dest: &DestDir,
    config: &ExtractConfig,
    buffer: &mut CopyBuffer,
    progress: &mut dyn ProgressCallback,
) -> Result<u64> {
    let output_path = dest.join(&planned.validated.safe_path);

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    remove_existing(&output_path)?;

    let output_file = File::create(&output_path)?;
    let mut writer = BufWriter::with_capacity(64 * 1024, output_file);
    let written = copy_with_buffer(payload, &mut writer, buffer, |n| {
        progress.on_bytes_written(n);
    })?;
    writer.flush()?;

    if config.preserve_permissions
        && let Some(mode) = planned.validated.mode
    {
        apply_mode(&output_path, mode)?;
    }

    Ok(written)
}

fn create_directory(path: &SafePath, dest: &DestDir) -> Result<PathBuf> {
    let output_path = dest.join(path);
    if !path.is_root() {
        remove_existing(&output_path)?;
    }
    fs::create_dir_all(&output_path)?;
    Ok(output_path)
}

#[cfg(unix)]
fn create_symlink(symlink: &SafeSymlink, dest: &DestDir) -> Result<()> {
    let link_path = dest.join(symlink.link());

    if let Some(parent) = link_path.parent() {
        fs::create_dir_all(parent)?;
    }
    remove_existing(&link_path)?;

    std::os::unix::fs::symlink(symlink.target_path(), &link_path)?;
    Ok(())
}

#[cfg(not(unix))]
fn create_symlink(_symlink: &SafeSymlink, _dest: &DestDir) -> Result<()> {
    Err(ExtractionError::SecurityViolation {
        reason: "symlinks are not supported on this platform".into(),
    })
}

fn create_hardlink(link: &SafePath, target: &SafePath, dest: &DestDir) -> Result<()> {
    let link_path = dest.join(link);

    if let Some(parent) = link_path.parent() {
        fs::create_dir_all(parent)?;
    }
    remove_existing(&link_path)?;

    fs::hard_link(dest.join(target), &link_path)?;
    Ok(())
}

/// Unlinks a file or symlink at `path` so it is replaced rather than written
/// through. Directories are left alone.
fn remove_existing(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => {
            fs::remove_file(path)?;
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_existing_file_and_missing() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("f");
        fs::write(&file, "x").unwrap();

        remove_existing(&file).unwrap();
        assert!(!file.exists());
        remove_existing(&file).unwrap();
    }

    #[test]
    fn test_remove_existing_keeps_directories() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("d");
        fs::create_dir(&dir).unwrap();

        remove_existing(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    #[cfg(unix)]
    fn test_remove_existing_unlinks_symlink_not_target() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target");
        let link = temp.path().join("link");
        fs::write(&target, "keep").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        remove_existing(&link).unwrap();
        assert!(fs::symlink_metadata(&link).is_err());
        assert_eq!(fs::read_to_string(&target).unwrap(), "keep");
    }
}
