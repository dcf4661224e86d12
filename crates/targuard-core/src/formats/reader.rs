//! Tar member iteration.

use std::io::Read;
use std::path::PathBuf;

use tar::EntryType;

use crate::ExtractionError;
use crate::Result;
use crate::formats::ArchiveSource;
use crate::types::Member;
use crate::types::MemberKind;

/// Calls `visit` for every member of the archive, in archive order.
///
/// `visit` receives the member index (counting only visited members), the
/// parsed header and a reader over the member payload. PAX and GNU
/// extension headers are folded into the member they describe and never
/// visited on their own.
pub(crate) fn for_each_member<F>(source: &ArchiveSource, mut visit: F) -> Result<()>
where
    F: FnMut(usize, Member, &mut dyn Read) -> Result<()>,
{
    let reader = source.open()?;
    let mut archive = tar::Archive::new(reader);

    let entries = archive
        .entries()
        .map_err(|e| ExtractionError::InvalidArchive(format!("failed to read tar entries: {e}")))?;

    let mut index = 0;
    for entry_result in entries {
        let mut entry = entry_result
            .map_err(|e| ExtractionError::InvalidArchive(format!("failed to read tar entry: {e}")))?;

        let Some(member) = member_from_entry(&entry)? else {
            continue;
        };

        visit(index, member, &mut entry)?;
        index += 1;
    }

    Ok(())
}

fn member_from_entry<R: Read>(entry: &tar::Entry<'_, R>) -> Result<Option<Member>> {
    let header = entry.header();
    let entry_type = header.entry_type();

    if matches!(
        entry_type,
        EntryType::XGlobalHeader | EntryType::XHeader | EntryType::GNULongName | EntryType::GNULongLink
    ) {
        return Ok(None);
    }

    let path = entry
        .path()
        .map_err(|e| ExtractionError::InvalidArchive(format!("invalid member path: {e}")))?
        .into_owned();

    let kind = match entry_type {
        EntryType::Regular | EntryType::Continuous => MemberKind::File,
        EntryType::Directory => MemberKind::Directory,
        EntryType::Symlink => MemberKind::Symlink {
            target: link_target(entry)?,
        },
        EntryType::Link => MemberKind::Hardlink {
            target: link_target(entry)?,
        },
        other => MemberKind::Other(other.as_byte()),
    };

    Ok(Some(Member {
        path,
        kind,
        size: entry.size(),
        mode: header.mode().ok(),
    }))
}

fn link_target<R: Read>(entry: &tar::Entry<'_, R>) -> Result<PathBuf> {
    let target = entry
        .link_name()
        .map_err(|e| ExtractionError::InvalidArchive(format!("invalid link target: {e}")))?;

    // An empty link name is rejected later by link validation.
    Ok(target.map(std::borrow::Cow::into_owned).unwrap_or_default())
}
