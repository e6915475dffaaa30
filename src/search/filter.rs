//! # Search Filters
//!
//! Filters use `find`'s vocabulary so configs read the same whichever walker
//! runs them:
//!
//! | Key | Value | Matches |
//! |-----|-------|---------|
//! | `type` | `d`, `f`, `l` | entry kind; links are followed, so `l` only matches broken links |
//! | `name` / `iname` | glob | the entry's file name |
//! | `path` / `wholename` | glob | the whole path |
//! | `ipath` / `iwholename` | glob | the whole path, ignoring case |
//!
//! As with `find`, `*` also matches `/` in globs.

use crate::error::ConfigError;
use globset::{GlobBuilder, GlobMatcher};
use std::path::Path;

/// The kind of filesystem entry a `type` filter selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Symlink,
}

impl EntryKind {
    /// Parse a `find -type` letter.
    pub fn from_flag(flag: &str) -> Result<Self, ConfigError> {
        match flag {
            "d" => Ok(Self::Directory),
            "f" => Ok(Self::File),
            "l" => Ok(Self::Symlink),
            other => Err(ConfigError::InvalidEntryKind(other.to_string())),
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Self::Directory => "d",
            Self::File => "f",
            Self::Symlink => "l",
        }
    }
}

/// A compiled glob that remembers its source text.
#[derive(Debug, Clone)]
pub struct Pattern {
    text: String,
    case_insensitive: bool,
    matcher: GlobMatcher,
}

impl Pattern {
    pub fn new(text: &str, case_insensitive: bool) -> Result<Self, ConfigError> {
        let matcher = GlobBuilder::new(text)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|source| ConfigError::InvalidGlob {
                pattern: text.to_string(),
                source,
            })?
            .compile_matcher();

        Ok(Self {
            text: text.to_string(),
            case_insensitive,
            matcher,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn is_match(&self, path: impl AsRef<Path>) -> bool {
        self.matcher.is_match(path)
    }
}

/// One predicate an entry must satisfy to be reported.
#[derive(Debug, Clone)]
pub enum Filter {
    Kind(EntryKind),
    Name(Pattern),
    Path(Pattern),
}

impl Filter {
    /// Build a filter from one `search` key/value pair of a project root.
    pub fn parse(key: &str, value: &str) -> Result<Self, ConfigError> {
        match key {
            "type" => Ok(Self::Kind(EntryKind::from_flag(value)?)),
            "name" => Ok(Self::Name(Pattern::new(value, false)?)),
            "iname" => Ok(Self::Name(Pattern::new(value, true)?)),
            "path" | "wholename" => Ok(Self::Path(Pattern::new(value, false)?)),
            "ipath" | "iwholename" => Ok(Self::Path(Pattern::new(value, true)?)),
            other => Err(ConfigError::UnknownFilter(other.to_string())),
        }
    }

    /// The filter used when a root configures none.
    pub fn directories() -> Self {
        Self::Kind(EntryKind::Directory)
    }
}
