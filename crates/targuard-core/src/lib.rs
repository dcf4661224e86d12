//! Tar archive extraction that refuses to write outside the destination.
//!
//! `targuard-core` extracts tar and gzip-compressed tar archives. Every
//! member is validated before anything is written, and a rejected archive
//! leaves the destination untouched. Member paths that resolve outside the
//! destination (`../x`, `/etc/passwd`) are rejected, as are links whose
//! targets escape it.
//!
//! # Examples
//!
//! ```no_run
//! use targuard_core::ExtractConfig;
//! use targuard_core::extract_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractConfig::default();
//! let report = extract_archive("results.tar.gz", "analysis", &config)?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
mod copy;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod inspection;
pub mod report;
pub mod security;
#[doc(hidden)]
pub mod test_utils;
pub mod types;

pub use api::extract_archive;
pub use api::extract_archive_with_progress;
pub use api::extract_bytes;
pub use api::list_archive;
pub use api::verify_archive;
pub use config::AllowedMembers;
pub use config::ExtractConfig;
pub use error::ExtractionError;
pub use error::Result;
pub use extraction::Extractor;
pub use formats::ArchiveSource;
pub use formats::Compression;
pub use inspection::ArchiveManifest;
pub use inspection::VerificationReport;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;

pub use types::DestDir;
pub use types::Member;
pub use types::MemberKind;
pub use types::SafePath;
pub use types::SafeSymlink;
