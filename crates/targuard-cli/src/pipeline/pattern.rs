//! Wildcard expansion for `clean` patterns.
//!
//! Only the last component of a pattern may contain `*`, which matches any
//! run of characters (including none) within that component.

use anyhow::Result;
use anyhow::bail;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use targuard_core::DestDir;

use super::resolve_dir_for_write;

/// Matches a single file name against a `*` pattern.
///
/// ```text
/// kmeans_*_*  matches  kmeans_5_1, kmeans_10_2
/// kmeans_*_*  rejects  kmeans_5, kmeans
/// ```
pub fn component_matches(name: &str, pattern: &str) -> bool {
    let mut parts = pattern.split('*');

    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = name.strip_prefix(first) else {
        return false;
    };

    let parts: Vec<&str> = parts.collect();
    let Some((last, middle)) = parts.split_last() else {
        // No `*` at all: exact match.
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }

    rest.len() >= last.len() && rest.ends_with(last)
}

/// Lists the entries under `root` matching `pattern`, sorted by path.
///
/// A missing parent directory yields no matches.
///
/// # Errors
///
/// Returns an error if a `*` appears outside the last component, the parent
/// directory escapes `root`, it or one of its ancestors is a symlink, or it
/// cannot be read.
pub fn expand(root: &DestDir, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern_path = Path::new(pattern);
    let Some(last) = pattern_path.file_name().and_then(|name| name.to_str()) else {
        bail!("pattern '{pattern}' has no final component");
    };
    let parent = pattern_path.parent().unwrap_or_else(|| Path::new(""));
    if parent.to_string_lossy().contains('*') {
        bail!("pattern '{pattern}': '*' is only allowed in the last component");
    }

    let dir = resolve_dir_for_write(root, parent)?;
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| component_matches(name, last))
        {
            matches.push(entry.path());
        }
    }
    matches.sort();

    Ok(matches)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_component_matches() {
        assert!(component_matches("kmeans_5_1", "kmeans_*_*"));
        assert!(component_matches("kmeans_10_2", "kmeans_*_*"));
        assert!(component_matches("kmeans__", "kmeans_*_*"));
        assert!(!component_matches("kmeans_5", "kmeans_*_*"));
        assert!(!component_matches("xkmeans_5_1", "kmeans_*_*"));

        assert!(component_matches("stat.0.out", "*.out"));
        assert!(component_matches("stat.0.out", "stat*"));
        assert!(component_matches("stat.0.out", "stat.0.out"));
        assert!(!component_matches("stat.0.out", "stat.0"));
        assert!(component_matches("anything", "*"));
    }

    #[test]
    fn test_overlapping_prefix_and_suffix() {
        // "ab" must not satisfy "ab*b": the suffix would reuse the prefix.
        assert!(!component_matches("ab", "ab*b"));
        assert!(component_matches("abb", "ab*b"));
    }

    #[test]
    fn test_expand_lists_matching_entries() {
        let temp = TempDir::new().unwrap();
        let root = DestDir::new(temp.path()).unwrap();
        let analysis = root.as_path().join("analysis");
        fs::create_dir_all(analysis.join("kmeans_5_1")).unwrap();
        fs::create_dir_all(analysis.join("kmeans_10_1")).unwrap();
        fs::write(analysis.join("clustering.py"), "").unwrap();

        let found = expand(&root, "analysis/kmeans_*_*").unwrap();
        assert_eq!(
            found,
            [analysis.join("kmeans_10_1"), analysis.join("kmeans_5_1")]
        );
    }

    #[test]
    fn test_expand_missing_parent_is_empty() {
        let temp = TempDir::new().unwrap();
        let root = DestDir::new(temp.path()).unwrap();
        assert!(expand(&root, "nowhere/*").unwrap().is_empty());
    }

    #[test]
    fn test_expand_rejects_escaping_parent() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("root")).unwrap();
        let root = DestDir::new(temp.path().join("root")).unwrap();
        assert!(expand(&root, "../*").is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_expand_rejects_symlinked_parent() {
        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::create_dir(outside.path().join("kmeans_5_1")).unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("analysis")).unwrap();
        let root = DestDir::new(temp.path()).unwrap();

        assert!(expand(&root, "analysis/kmeans_*_*").is_err());
        assert!(expand(&root, "analysis/deeper/*").is_err());
    }

    #[test]
    fn test_expand_rejects_wildcard_in_parent() {
        let temp = TempDir::new().unwrap();
        let root = DestDir::new(temp.path()).unwrap();
        assert!(expand(&root, "a*/b").is_err());
    }
}
