//! Typed errors for the parts of the input that are validated up front.
//!
//! Everything else flows through `anyhow` with context attached at the call
//! site; these variants exist so callers can tell a bad config entry or a bad
//! history line apart from an I/O failure.

use thiserror::Error;

/// A `project_roots` entry that can't be turned into a search.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("project root path must not be empty")]
    EmptyRootPath,

    #[error("unknown search filter '{0}' (expected type, name, iname, path, ipath, wholename or iwholename)")]
    UnknownFilter(String),

    #[error("invalid entry type '{0}' (expected d, f or l)")]
    InvalidEntryKind(String),

    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("min depth {min} is greater than max depth {max}")]
    DepthRange { min: usize, max: usize },
}

/// A line of the usage-history file that doesn't have the
/// `path|frequency|timestamp` shape.
#[derive(Error, Debug, PartialEq)]
pub enum HistoryLineError {
    #[error("expected 'path|frequency|timestamp'")]
    MissingFields,

    #[error("invalid frequency '{0}'")]
    InvalidFrequency(String),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("line is not valid UTF-8")]
    NotUtf8,
}
