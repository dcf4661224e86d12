//! Test utilities for building in-memory tar archives.
//!
//! Used by this crate's tests, benches and by the CLI tests. The raw-name
//! methods write member names straight into the header, so archives with
//! `../` or absolute member paths (which `tar::Builder` refuses to produce)
//! can be built for security tests.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Write;

use tar::EntryType;

/// Gzip-compresses `data`.
fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Builder for tar test archives with various member types.
///
/// # Examples
///
/// ```
/// use targuard_core::test_utils::TarTestBuilder;
///
/// let tar_data = TarTestBuilder::new()
///     .add_file("file.txt", b"content")
///     .add_directory("dir/")
///     .add_symlink("link", "file.txt")
///     .add_raw_file("../escape.txt", b"malicious")
///     .build_gz();
/// ```
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Creates a new tar test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// Adds a regular file.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a regular file with custom mode.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a directory.
    #[must_use]
    pub fn add_directory(self, path: &str) -> Self {
        self.add_directory_with_mode(path, 0o755)
    }

    /// Adds a directory with custom mode.
    #[must_use]
    pub fn add_directory_with_mode(mut self, path: &str, mode: u32) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(mode);
        header.set_entry_type(EntryType::Directory);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a symlink. The target is stored verbatim and may be absolute or
    /// contain `..`.
    #[must_use]
    pub fn add_symlink(self, path: &str, target: &str) -> Self {
        self.add_raw(path, EntryType::Symlink, 0o777, Some(target), &[])
    }

    /// Adds a hardlink. The target is stored verbatim.
    #[must_use]
    pub fn add_hardlink(self, path: &str, target: &str) -> Self {
        self.add_raw(path, EntryType::Link, 0o644, Some(target), &[])
    }

    /// Adds a fifo (a member type that is never extracted).
    #[must_use]
    pub fn add_fifo(self, path: &str) -> Self {
        self.add_raw(path, EntryType::Fifo, 0o644, None, &[])
    }

    /// Adds a regular file whose name is written into the header unchecked,
    /// e.g. `../escape.txt` or `/etc/passwd`.
    #[must_use]
    pub fn add_raw_file(self, name: &str, data: &[u8]) -> Self {
        self.add_raw(name, EntryType::Regular, 0o644, None, data)
    }

    /// Adds a directory whose name is written into the header unchecked.
    #[must_use]
    pub fn add_raw_directory(self, name: &str) -> Self {
        self.add_raw(name, EntryType::Directory, 0o755, None, &[])
    }

    fn add_raw(
        mut self,
        name: &str,
        entry_type: EntryType,
        mode: u32,
        link: Option<&str>,
        data: &[u8],
    ) -> Self {
        let mut header = tar::Header::new_gnu();
        {
            let old = header.as_old_mut();
            copy_field(&mut old.name, name);
            if let Some(link) = link {
                copy_field(&mut old.linkname, link);
            }
        }
        header.set_entry_type(entry_type);
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    /// Returns the uncompressed tar bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }

    /// Returns the archive compressed with gzip.
    #[must_use]
    pub fn build_gz(self) -> Vec<u8> {
        gzip(&self.build())
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn copy_field(field: &mut [u8; 100], value: &str) {
    let bytes = value.as_bytes();
    assert!(bytes.len() < field.len(), "raw tar name too long: {value}");
    field.fill(0);
    field[..bytes.len()].copy_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_name_survives() {
        let data = TarTestBuilder::new()
            .add_raw_file("../../etc/passwd", b"x")
            .build();
        let mut archive = tar::Archive::new(data.as_slice());
        let entry = archive.entries().unwrap().next().unwrap().unwrap();
        assert_eq!(
            entry.path().unwrap().to_str().unwrap(),
            "../../etc/passwd"
        );
    }

    #[test]
    fn test_build_gz_has_magic() {
        let data = TarTestBuilder::new().add_file("a", b"b").build_gz();
        assert_eq!(&data[..2], &[0x1f, 0x8b]);
    }
}
