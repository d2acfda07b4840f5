//! Glob matching of upstream files.
//!
//! Patterns are matched against `/`-separated paths relative to the root.
//! `*` stays within one path segment, `**` crosses segments. `.git`
//! directories are never descended into.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use walkdir::{DirEntry, WalkDir};

use crate::error::SyncError;

/// Compile `patterns` into a single matcher.
pub fn compile(patterns: &[String]) -> Result<GlobSet, SyncError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| SyncError::InvalidPattern { pattern: pattern.clone(), source })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| SyncError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })
}

/// Files under `root` matching any of `patterns`, as sorted relative paths.
pub fn match_files(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, SyncError> {
    if patterns.is_empty() {
        return Ok(Vec::new());
    }
    let set = compile(patterns)?;
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_git_dir(e));
    for entry in walker {
        let entry = entry.map_err(|source| SyncError::Walk { root: root.to_path_buf(), source })?;
        if entry.file_type().is_dir() || !entry.path().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if set.is_match(slash_path(relative)) {
            files.push(relative.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == ".git"
}

pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn tree(files: &[&str]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for f in files {
            let path = tmp.path().join(f);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, f).unwrap();
        }
        tmp
    }

    fn names(files: Vec<PathBuf>) -> Vec<String> {
        files.iter().map(|p| slash_path(p)).collect()
    }

    #[rstest]
    #[case("README.md", &["README.md"])]
    #[case("*.md", &["README.md"])]
    #[case("docs/*", &["docs/a.md"])]
    #[case("docs/**", &["docs/a.md", "docs/deep/b.md"])]
    #[case("**/*.md", &["README.md", "docs/a.md", "docs/deep/b.md"])]
    #[case("nothing/**", &[])]
    fn glob_semantics(#[case] pattern: &str, #[case] expected: &[&str]) {
        let tmp = tree(&["README.md", "docs/a.md", "docs/deep/b.md", "src/main.rs"]);
        let found = match_files(tmp.path(), &[pattern.to_string()]).unwrap();
        assert_eq!(names(found), expected);
    }

    #[test]
    fn git_dir_is_skipped() {
        let tmp = tree(&[".git/config", "a.txt"]);
        let found = match_files(tmp.path(), &["**".to_string()]).unwrap();
        assert_eq!(names(found), vec!["a.txt"]);
    }

    #[test]
    fn empty_pattern_list_matches_nothing() {
        let tmp = tree(&["a.txt"]);
        assert!(match_files(tmp.path(), &[]).unwrap().is_empty());
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let tmp = tree(&["a.txt"]);
        let err = match_files(tmp.path(), &["a[".to_string()]).unwrap_err();
        assert!(matches!(err, SyncError::InvalidPattern { .. }));
        assert!(err.to_string().contains("a["));
    }
}
