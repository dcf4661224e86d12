//! Archive listing implementation.

use crate::Result;
use crate::formats::ArchiveSource;
use crate::formats::reader::for_each_member;
use crate::inspection::manifest::ArchiveManifest;

/// Lists archive members without extracting or validating them.
///
/// Member paths and link targets are reported exactly as stored, including
/// ones that extraction would reject.
///
/// # Errors
///
/// Returns an error if the source cannot be read or is not a tar stream.
pub fn list_members(source: &ArchiveSource) -> Result<ArchiveManifest> {
    let mut manifest = ArchiveManifest::new(source.compression()?);

    for_each_member(source, |_, member, _| {
        manifest.add_entry(member);
        Ok(())
    })?;

    Ok(manifest)
}
