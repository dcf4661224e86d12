//! Symlink escape attacks.

use std::fs;

use targuard_core::ExtractConfig;
use targuard_core::ExtractionError;
use targuard_core::test_utils::TarTestBuilder;
use tempfile::TempDir;

use crate::entry_count;
use crate::extract;
use crate::extract_with;

#[test]
#[cfg(unix)]
fn test_symlink_absolute_target() {
    let temp = TempDir::new().unwrap();
    let archive = TarTestBuilder::new()
        .add_symlink("malicious_link", "/etc/passwd")
        .build();

    let result = extract(archive, temp.path());
    assert!(matches!(result, Err(ExtractionError::SymlinkEscape { .. })));
    assert_eq!(entry_count(temp.path()), 0);
}

#[test]
#[cfg(unix)]
fn test_symlink_parent_traversal() {
    let temp = TempDir::new().unwrap();
    let archive = TarTestBuilder::new()
        .add_symlink("dir/link", "../../outside")
        .build();

    let result = extract(archive, temp.path());
    assert!(matches!(result, Err(ExtractionError::SymlinkEscape { .. })));
}

#[test]
#[cfg(unix)]
fn test_symlink_then_write_through_it() {
    // classic two-step: a harmless-looking link, then a file below it
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("out");
    let archive = TarTestBuilder::new()
        .add_directory("sub/")
        .add_symlink("sub/up", "..")
        .add_raw_file("sub/up/file.txt", b"payload")
        .build();

    let result = extract(archive, &dest);
    assert!(matches!(result, Err(ExtractionError::SymlinkEscape { .. })));
    assert!(!dest.exists());
}

#[test]
#[cfg(unix)]
fn test_existing_symlink_in_destination_not_followed() {
    let temp = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    std::os::unix::fs::symlink(outside.path(), temp.path().join("shared")).unwrap();

    let archive = TarTestBuilder::new()
        .add_file("shared/planted.txt", b"payload")
        .build();

    let result = extract(archive, temp.path());
    assert!(matches!(result, Err(ExtractionError::SymlinkEscape { .. })));
    assert_eq!(entry_count(outside.path()), 0);
}

#[test]
#[cfg(unix)]
fn test_symlink_target_through_earlier_symlink() {
    // `self/../secret.txt` normalizes inside, but the kernel follows `self`
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("out");
    fs::write(temp.path().join("secret.txt"), "outside-secret").unwrap();
    let archive = TarTestBuilder::new()
        .add_symlink("self", ".")
        .add_symlink("leak", "self/../secret.txt")
        .build();

    let result = extract(archive, &dest);
    assert!(matches!(result, Err(ExtractionError::SymlinkEscape { .. })));
    assert!(!dest.exists());
}

#[test]
#[cfg(unix)]
fn test_symlink_declared_on_earlier_target_route() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("out");
    let archive = TarTestBuilder::new()
        .add_symlink("leak", "self/../secret.txt")
        .add_symlink("self", ".")
        .build();

    let result = extract(archive, &dest);
    assert!(matches!(result, Err(ExtractionError::SymlinkEscape { .. })));
    assert!(!dest.exists());
}

#[test]
#[cfg(unix)]
fn test_symlink_target_through_existing_symlink() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("out");
    fs::create_dir(&dest).unwrap();
    fs::write(temp.path().join("secret.txt"), "outside-secret").unwrap();
    std::os::unix::fs::symlink(".", dest.join("self")).unwrap();
    let archive = TarTestBuilder::new()
        .add_symlink("leak", "self/../secret.txt")
        .build();

    let result = extract(archive, &dest);
    assert!(matches!(result, Err(ExtractionError::SymlinkEscape { .. })));
    assert!(fs::symlink_metadata(dest.join("leak")).is_err());
}

#[test]
#[cfg(unix)]
fn test_symlink_relative_safe() {
    let temp = TempDir::new().unwrap();
    let archive = TarTestBuilder::new()
        .add_file("data/target.txt", b"content")
        .add_symlink("data/link", "target.txt")
        .add_symlink("top", "data/target.txt")
        .build();

    let report = extract(archive, temp.path()).unwrap();
    assert_eq!(report.symlinks_created, 2);
    assert_eq!(
        fs::read_to_string(temp.path().join("top")).unwrap(),
        "content"
    );
}

#[test]
fn test_symlinks_denied_by_strict_config() {
    let temp = TempDir::new().unwrap();
    let archive = TarTestBuilder::new()
        .add_file("target.txt", b"content")
        .add_symlink("link", "target.txt")
        .build();

    let result = extract_with(archive, temp.path(), &ExtractConfig::strict());
    assert!(matches!(
        result,
        Err(ExtractionError::SecurityViolation { .. })
    ));
    assert_eq!(entry_count(temp.path()), 0);
}
