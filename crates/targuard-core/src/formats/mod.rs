//! Archive input: byte sources, compression detection and tar parsing.

pub(crate) mod reader;
pub mod source;

pub use source::ArchiveSource;
pub use source::Compression;
