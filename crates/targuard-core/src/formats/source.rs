//! Archive byte sources and compression sniffing.

use std::fmt;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use flate2::read::GzDecoder;

use crate::Result;

/// Gzip magic bytes (`1f 8b`).
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compression wrapped around the tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Plain tar.
    None,
    /// Gzip-compressed tar.
    Gzip,
}

impl Compression {
    /// Detects compression from the first bytes of a stream.
    ///
    /// Anything that does not start with the gzip magic is treated as a
    /// plain tar stream. The file name is never consulted.
    #[must_use]
    pub fn sniff(prefix: &[u8]) -> Self {
        if prefix.starts_with(&GZIP_MAGIC) {
            Self::Gzip
        } else {
            Self::None
        }
    }

    /// Human-readable name of the format.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "tar",
            Self::Gzip => "tar.gz",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where archive bytes come from.
///
/// A source can be opened any number of times; each `open` starts reading
/// from the first byte again. Extraction relies on this to scan the archive
/// before writing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveSource {
    /// An archive file on disk.
    File(PathBuf),
    /// An archive held in memory, e.g. a downloaded response body.
    Memory(Vec<u8>),
}

impl ArchiveSource {
    /// Creates a source reading from a file.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Creates a source over an in-memory buffer.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Memory(bytes.into())
    }

    /// Returns the file path, if this source is a file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Memory(_) => None,
        }
    }

    /// Detects the compression of this source.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened or read.
    pub fn compression(&self) -> Result<Compression> {
        match self {
            Self::File(path) => {
                let mut reader = BufReader::new(File::open(path)?);
                Ok(Compression::sniff(reader.fill_buf()?))
            }
            Self::Memory(bytes) => Ok(Compression::sniff(bytes)),
        }
    }

    /// Opens a fresh decompressed tar stream.
    pub(crate) fn open(&self) -> Result<Box<dyn Read + '_>> {
        match self {
            Self::File(path) => {
                let file = File::open(path)?;
                decompress(BufReader::with_capacity(64 * 1024, file))
            }
            Self::Memory(bytes) => decompress(bytes.as_slice()),
        }
    }
}

impl fmt::Display for ArchiveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory(bytes) => write!(f, "<memory, {} bytes>", bytes.len()),
        }
    }
}

fn decompress<'a, R: BufRead + 'a>(mut reader: R) -> Result<Box<dyn Read + 'a>> {
    let compression = Compression::sniff(reader.fill_buf()?);
    Ok(match compression {
        Compression::Gzip => Box::new(GzDecoder::new(reader)),
        Compression::None => Box::new(reader),
    })
}
