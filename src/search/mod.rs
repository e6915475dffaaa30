//! # Search Module
//!
//! Turns configured project roots into streams of displayable paths.
//!
//! ## Overview
//!
//! Directory traversal sits behind the [`TreeWalker`] trait. A walker takes a
//! [`SearchRequest`] (start directory, filters, depth bounds, pruned paths)
//! and yields matching paths lazily. Two walkers ship with the crate:
//!
//! | Walker | Config value | Backend |
//! |--------|--------------|---------|
//! | [`NativeWalker`] | `"native"` | in-process `walkdir` scan |
//! | [`FindWalker`] | `"find"` | `find -L` subprocess |
//!
//! Both follow symlinks and skip subtrees they can't read.
//!
//! [`RootSearcher`] drives a walker for one [`RootSpec`] and converts every
//! hit back into its templated display form.

pub mod filter;
pub mod find;
pub mod native;

pub use filter::{EntryKind, Filter, Pattern};
pub use find::FindWalker;
pub use native::NativeWalker;

use crate::config::{RootSpec, WalkerKind};
use crate::template::TemplateResolver;
use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A lazy, finite stream of matching paths.
pub type Walk = Box<dyn Iterator<Item = PathBuf>>;

/// Everything a walker needs to run one traversal.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub root: PathBuf,
    /// All filters must match for an entry to be reported. Empty matches
    /// every entry.
    pub filters: Vec<Filter>,
    pub min_depth: Option<usize>,
    pub max_depth: Option<usize>,
    /// Whole-path globs; a matching entry is neither reported nor entered.
    pub prune: Vec<Pattern>,
}

impl SearchRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filters: Vec::new(),
            min_depth: None,
            max_depth: None,
            prune: Vec::new(),
        }
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_depth(mut self, min_depth: Option<usize>, max_depth: Option<usize>) -> Self {
        self.min_depth = min_depth;
        self.max_depth = max_depth;
        self
    }

    pub fn with_prune(mut self, prune: Vec<Pattern>) -> Self {
        self.prune = prune;
        self
    }
}

/// Something that can walk a directory tree.
pub trait TreeWalker {
    /// Start a traversal. A missing or unreadable root yields an empty walk;
    /// an `Err` means the walker itself could not run.
    fn walk(&self, request: &SearchRequest) -> Result<Walk>;
}

/// Pick the walker implementation named in the config.
pub fn walker_for(kind: WalkerKind) -> Box<dyn TreeWalker> {
    match kind {
        WalkerKind::Native => Box::new(NativeWalker),
        WalkerKind::Find => Box::new(FindWalker::default()),
    }
}

/// A path as it will be printed, e.g. `~/src/app`.
///
/// Equality is on the display string, never on the resolved path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResultPath(String);

impl ResultPath {
    pub fn new(display_form: impl Into<String>) -> Self {
        Self(display_form.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResultPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResultPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Runs one project root through a [`TreeWalker`].
pub struct RootSearcher<'a> {
    walker: &'a dyn TreeWalker,
    resolver: &'a TemplateResolver,
}

impl<'a> RootSearcher<'a> {
    pub fn new(walker: &'a dyn TreeWalker, resolver: &'a TemplateResolver) -> Self {
        Self { walker, resolver }
    }

    /// The traversal a root spec asks for.
    pub fn request_for(&self, spec: &RootSpec) -> SearchRequest {
        SearchRequest::new(self.resolver.resolve(&spec.path_template))
            .with_filters(spec.filters.clone())
            .with_depth(spec.min_depth, spec.max_depth)
    }

    /// Walk one root, yielding display paths in walker order.
    pub fn search<'s>(&'s self, spec: &'s RootSpec) -> Result<impl Iterator<Item = ResultPath> + 's> {
        let request = self.request_for(spec);
        if !request.root.is_dir() {
            debug!(root = %request.root.display(), "Project root is missing, skipping");
        }

        let hits = self.walker.walk(&request)?;
        let resolver: &'s TemplateResolver = self.resolver;
        let template = spec.path_template.as_str();
        let report_parent = spec.report_parent;

        Ok(hits.map(move |hit| {
            let path = if report_parent {
                hit.parent().map(Path::to_path_buf).unwrap_or(hit)
            } else {
                hit
            };
            ResultPath::new(resolver.unresolve(template, &path.to_string_lossy()))
        }))
    }
}
