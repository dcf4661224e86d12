//! Path traversal attacks.

use targuard_core::ExtractionError;
use targuard_core::test_utils::TarTestBuilder;
use tempfile::TempDir;

use crate::entry_count;
use crate::extract;

#[test]
fn test_python_tarfile_style_traversal() {
    let malicious_paths = [
        "../etc/passwd",
        "../../etc/passwd",
        "foo/../../etc/passwd",
        "foo/../../../etc/passwd",
        "./../escape",
    ];

    for path in malicious_paths {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out");
        let archive = TarTestBuilder::new()
            .add_file("first.txt", b"innocent")
            .add_raw_file(path, b"payload")
            .build_gz();

        let result = extract(archive, &dest);
        assert!(
            matches!(result, Err(ExtractionError::PathTraversal { .. })),
            "path should be rejected: {path}"
        );
        assert_eq!(entry_count(temp.path()), 0, "nothing may be written: {path}");
    }
}

#[test]
#[cfg(unix)]
fn test_absolute_path_attack() {
    for path in ["/etc/passwd", "/tmp/malicious", "//etc/shadow"] {
        let temp = TempDir::new().unwrap();
        let archive = TarTestBuilder::new().add_raw_file(path, b"payload").build();

        let result = extract(archive, temp.path());
        assert!(
            matches!(result, Err(ExtractionError::PathTraversal { .. })),
            "absolute path should be rejected: {path}"
        );
        assert_eq!(entry_count(temp.path()), 0);
    }
}

#[test]
fn test_traversal_in_directory_member() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("out");
    let archive = TarTestBuilder::new().add_raw_directory("../sneaky/").build();

    let result = extract(archive, &dest);
    assert!(matches!(result, Err(ExtractionError::PathTraversal { .. })));
    assert!(!temp.path().join("sneaky").exists());
}

#[test]
fn test_destination_name_prefix_is_not_containment() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("out");
    let archive = TarTestBuilder::new()
        .add_raw_file("../out-evil/file", b"payload")
        .add_raw_file("../outx", b"payload")
        .build();

    let result = extract(archive, &dest);
    assert!(matches!(result, Err(ExtractionError::PathTraversal { .. })));
    assert_eq!(entry_count(temp.path()), 0);
}

#[test]
fn test_safe_paths_allowed() {
    let temp = TempDir::new().unwrap();
    let archive = TarTestBuilder::new()
        .add_file("file.txt", b"1")
        .add_file("dir/file.txt", b"2")
        .add_file("dir/subdir/file.txt", b"3")
        .add_raw_file("./dot/file.txt", b"4")
        .add_raw_file("up/../down.txt", b"5")
        .build();

    let report = extract(archive, temp.path()).unwrap();
    assert_eq!(report.files_extracted, 5);
    assert!(temp.path().join("dot/file.txt").is_file());
    assert!(temp.path().join("down.txt").is_file());
}
