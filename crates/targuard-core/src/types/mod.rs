//! Type-safe wrappers for archive extraction operations.
//!
//! Security types are validated upon construction and cannot be created from
//! raw paths without going through validation. There are no
//! `From<PathBuf>` implementations for them.

pub mod dest_dir;
pub mod member;
pub mod safe_path;
pub mod safe_symlink;

pub use dest_dir::DestDir;
pub use member::Member;
pub use member::MemberKind;
pub use safe_path::SafePath;
pub use safe_symlink::SafeSymlink;
