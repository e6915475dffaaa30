//! # Unranked Listings
//!
//! Quick listings around the current directory that skip configuration roots
//! and frecency entirely:
//!
//! | Command | Lists |
//! |---------|-------|
//! | `parent-dirs` | ancestors of the current directory, nearest first |
//! | `parent-files` | every entry directly inside the current directory and each ancestor |
//! | `content-dirs` | directories below the current directory, relative |
//! | `content-files` | files below the current directory, relative |
//!
//! Content listings never descend into `.git`.

use crate::search::{EntryKind, Filter, Pattern, SearchRequest, TreeWalker, Walk};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Subtrees content listings never enter.
pub const PRUNED_DIRS: &[&str] = &["*/.git"];

/// Ancestors of `cwd`, nearest first, excluding `cwd` itself.
pub fn parent_dirs(cwd: &Path) -> Vec<PathBuf> {
    cwd.ancestors().skip(1).map(Path::to_path_buf).collect()
}

/// For `cwd` and each ancestor, the directory itself and its direct entries.
pub fn parent_files(cwd: &Path, walker: &dyn TreeWalker) -> Result<Walk> {
    let walks = cwd
        .ancestors()
        .map(|dir| {
            walker
                .walk(&SearchRequest::new(dir).with_depth(None, Some(1)))
                .with_context(|| format!("Failed to list {}", dir.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Box::new(walks.into_iter().flatten()))
}

/// Directories below `cwd`, relative to it.
pub fn content_dirs(cwd: &Path, walker: &dyn TreeWalker) -> Result<Box<dyn Iterator<Item = String>>> {
    content(cwd, EntryKind::Directory, walker)
}

/// Files below `cwd`, relative to it.
pub fn content_files(cwd: &Path, walker: &dyn TreeWalker) -> Result<Box<dyn Iterator<Item = String>>> {
    content(cwd, EntryKind::File, walker)
}

fn content(
    cwd: &Path,
    kind: EntryKind,
    walker: &dyn TreeWalker,
) -> Result<Box<dyn Iterator<Item = String>>> {
    let prune = PRUNED_DIRS
        .iter()
        .map(|glob| Pattern::new(glob, false))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to build prune patterns")?;

    let request = SearchRequest::new(cwd)
        .with_filters(vec![Filter::Kind(kind)])
        .with_depth(Some(1), None)
        .with_prune(prune);

    let base = cwd.to_path_buf();
    let hits = walker.walk(&request)?;

    Ok(Box::new(hits.map(move |path| {
        path.strip_prefix(&base)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned()
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::NativeWalker;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/bin")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join("Cargo.toml"), "[package]").unwrap();
        fs::write(root.join("src/lib.rs"), "").unwrap();
        fs::write(root.join(".git/HEAD"), "ref").unwrap();
        temp_dir
    }

    fn sorted(items: impl Iterator<Item = String>) -> Vec<String> {
        let mut items: Vec<_> = items.collect();
        items.sort();
        items
    }

    #[test]
    fn test_parent_dirs_nearest_first() {
        let dirs = parent_dirs(Path::new("/home/tester/src/app"));
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/home/tester/src"),
                PathBuf::from("/home/tester"),
                PathBuf::from("/home"),
                PathBuf::from("/"),
            ]
        );
        assert!(parent_dirs(Path::new("/")).is_empty());
    }

    #[test]
    fn test_content_dirs_relative_and_pruned() {
        let temp_dir = project();
        let dirs = sorted(content_dirs(temp_dir.path(), &NativeWalker).unwrap());
        assert_eq!(dirs, vec!["src", "src/bin"]);
    }

    #[test]
    fn test_content_files_relative_and_pruned() {
        let temp_dir = project();
        let files = sorted(content_files(temp_dir.path(), &NativeWalker).unwrap());
        assert_eq!(files, vec!["Cargo.toml", "src/lib.rs"]);
    }

    #[test]
    fn test_parent_files_starts_with_cwd() {
        let temp_dir = project();
        let cwd = temp_dir.path().join("src");
        let found: Vec<_> = parent_files(&cwd, &NativeWalker).unwrap().collect();

        // walkdir yields the directory itself before its children
        assert_eq!(found[0], cwd);
        assert!(found.contains(&cwd.join("lib.rs")));
        assert!(found.contains(&temp_dir.path().join("Cargo.toml")));
        assert!(found.contains(&cwd.join("bin")));
        assert!(found.contains(&temp_dir.path().join(".git")));
    }
}
