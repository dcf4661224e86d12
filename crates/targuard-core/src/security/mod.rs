//! Security validation modules.

pub mod hardlink;
pub mod path;
pub mod permissions;
pub mod symlink;
pub mod validator;

pub use hardlink::HardlinkTracker;
pub use path::is_within_directory;
pub use path::normalize;
pub use permissions::sanitize_mode;
pub use symlink::LinkTracker;
pub use validator::MemberValidator;
pub use validator::ValidatedKind;
pub use validator::ValidatedMember;
pub use validator::ValidationReport;
