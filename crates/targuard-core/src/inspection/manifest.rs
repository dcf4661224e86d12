//! Archive manifest types.

use crate::formats::Compression;
use crate::types::Member;

/// Every member of an archive, as declared in the headers.
#[derive(Debug, Clone)]
pub struct ArchiveManifest {
    /// Members in archive order.
    pub entries: Vec<Member>,

    /// Number of members.
    pub total_entries: usize,

    /// Sum of declared member sizes.
    pub total_size: u64,

    /// Compression of the archive stream.
    pub compression: Compression,
}

impl ArchiveManifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new(compression: Compression) -> Self {
        Self {
            entries: Vec::new(),
            total_entries: 0,
            total_size: 0,
            compression,
        }
    }

    /// Appends a member and updates the totals.
    pub fn add_entry(&mut self, member: Member) {
        self.total_entries += 1;
        self.total_size = self.total_size.saturating_add(member.size);
        self.entries.push(member);
    }

    /// Members that can never be extracted (fifo, devices, ...).
    pub fn special_entries(&self) -> impl Iterator<Item = &Member> {
        self.entries
            .iter()
            .filter(|m| matches!(m.kind, crate::types::MemberKind::Other(_)))
    }
}
