//! Hardlink attacks.

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
fn test_hardlink_absolute_target() {
    let temp = TempDir::new().unwrap();
    let archive = TarTestBuilder::new()
        .add_hardlink("shadow", "/etc/shadow")
        .build();

    let result = extract(archive, temp.path());
    assert!(matches!(result, Err(ExtractionError::HardlinkEscape { .. })));
    assert_eq!(entry_count(temp.path()), 0);
}

#[test]
fn test_hardlink_parent_traversal() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("out");
    fs::write(temp.path().join("secret"), "do not link").unwrap();

    let archive = TarTestBuilder::new()
        .add_hardlink("innocent", "../secret")
        .build();

    let result = extract(archive, &dest);
    assert!(matches!(result, Err(ExtractionError::HardlinkEscape { .. })));
    assert!(!dest.exists());
}

#[test]
#[cfg(unix)]
fn test_hardlink_through_existing_symlink() {
    let temp = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("secret"), "do not link").unwrap();
    std::os::unix::fs::symlink(outside.path(), temp.path().join("mnt")).unwrap();

    let archive = TarTestBuilder::new()
        .add_hardlink("grab", "mnt/secret")
        .build();

    let result = extract(archive, temp.path());
    assert!(matches!(result, Err(ExtractionError::HardlinkEscape { .. })));
    assert!(!temp.path().join("grab").exists());
}

#[test]
fn test_hardlink_relative_safe() {
    let temp = TempDir::new().unwrap();
    let archive = TarTestBuilder::new()
        .add_file("dir/original.txt", b"shared")
        .add_hardlink("dir/second.txt", "dir/original.txt")
        .add_hardlink("third.txt", "dir/second.txt")
        .build();

    let report = extract(archive, temp.path()).unwrap();
    assert_eq!(report.hardlinks_created, 2);
    assert_eq!(fs::read(temp.path().join("third.txt")).unwrap(), b"shared");
}

#[test]
fn test_hardlink_to_missing_member() {
    let temp = TempDir::new().unwrap();
    let archive = TarTestBuilder::new()
        .add_hardlink("dangling", "not-in-archive")
        .build();

    let result = extract(archive, temp.path());
    assert!(matches!(result, Err(ExtractionError::InvalidArchive(_))));
    assert_eq!(entry_count(temp.path()), 0);
}

#[test]
fn test_hardlinks_denied_by_strict_config() {
    let temp = TempDir::new().unwrap();
    let archive = TarTestBuilder::new()
        .add_file("a", b"x")
        .add_hardlink("b", "a")
        .build();

    let result = extract_with(archive, temp.path(), &ExtractConfig::strict());
    assert!(matches!(
        result,
        Err(ExtractionError::SecurityViolation { .. })
    ));
    assert_eq!(entry_count(temp.path()), 0);
}
