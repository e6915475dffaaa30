//! In-process tree walker built on `walkdir`.

use super::{EntryKind, Filter, SearchRequest, TreeWalker, Walk};
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Walks directories without spawning anything. Symlinks are followed and
/// link cycles are reported by `walkdir` as errors, which are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeWalker;

impl TreeWalker for NativeWalker {
    fn walk(&self, request: &SearchRequest) -> Result<Walk> {
        let mut walker = WalkDir::new(&request.root).follow_links(true);
        if let Some(min_depth) = request.min_depth {
            walker = walker.min_depth(min_depth);
        }
        if let Some(max_depth) = request.max_depth {
            walker = walker.max_depth(max_depth);
        }

        let min_depth = request.min_depth.unwrap_or(0);
        let prune = request.prune.clone();
        let entry_prune = prune.clone();
        let filters = request.filters.clone();

        let hits = walker
            .into_iter()
            .filter_entry(move |entry| !entry_prune.iter().any(|p| p.is_match(entry.path())))
            .filter_map(move |entry| match entry {
                Ok(entry) => Some(Hit::from(entry)),
                Err(err) => broken_link(&err, min_depth)
                    .filter(|hit| !prune.iter().any(|p| p.is_match(&hit.path)))
                    .or_else(|| {
                        debug!(error = %err, "Skipping unreadable entry");
                        None
                    }),
            })
            .filter(move |hit| filters.iter().all(|f| hit.matches(f)))
            .map(|hit| hit.path);

        Ok(Box::new(hits))
    }
}

/// A walked path and the kind `type` filters see for it.
struct Hit {
    path: PathBuf,
    kind: Option<EntryKind>,
}

impl From<DirEntry> for Hit {
    fn from(entry: DirEntry) -> Self {
        // With follow_links the file type is the link target's
        let file_type = entry.file_type();
        let kind = if file_type.is_dir() {
            Some(EntryKind::Directory)
        } else if file_type.is_file() {
            Some(EntryKind::File)
        } else {
            None
        };

        Self {
            path: entry.into_path(),
            kind,
        }
    }
}

impl Hit {
    fn matches(&self, filter: &Filter) -> bool {
        match filter {
            Filter::Kind(kind) => self.kind == Some(*kind),
            Filter::Name(pattern) => {
                let name = self.path.file_name().unwrap_or(self.path.as_os_str());
                pattern.is_match(Path::new(name))
            }
            Filter::Path(pattern) => pattern.is_match(&self.path),
        }
    }
}

/// A link whose target can't be read comes back from `walkdir` as an error.
/// `find -L` reports exactly these links as `type l`, so they are recovered
/// as hits instead of being dropped.
fn broken_link(err: &walkdir::Error, min_depth: usize) -> Option<Hit> {
    if err.depth() < min_depth || err.loop_ancestor().is_some() {
        return None;
    }

    let path = err.path()?;
    let is_link = fs::symlink_metadata(path).ok()?.file_type().is_symlink();
    if !is_link || fs::metadata(path).is_ok() {
        return None;
    }

    Some(Hit {
        path: path.to_path_buf(),
        kind: Some(EntryKind::Symlink),
    })
}
