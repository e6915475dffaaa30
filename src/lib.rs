//! fsearch - List project directories ranked by frecency
//!
//! This library provides the core functionality for resolving configured
//! project roots, searching them, merging the results and ordering them by
//! usage history, ready to be piped into a fuzzy finder.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod listing;
pub mod output;
pub mod rank;
pub mod search;
pub mod template;
pub mod usage;
