//! # Usage History Module
//!
//! Reads the directory-jump history kept by `z` (or a compatible tool such as
//! `zoxide`'s `z` import format) and turns it into per-path frecency scores.
//!
//! ## Overview
//!
//! fsearch never writes this file. It is read once per run and used to float
//! frequently and recently visited projects to the top of the list.
//!
//! ## Data Format
//!
//! One record per line, pipe-delimited, no header:
//!
//! ```text
//! /home/user/src/fsearch|42.5|1707128400
//! ```
//!
//! ## Rank
//!
//! ```text
//! rank = frequency * (3600 / seconds_since_last_visit)
//! ```

mod history;

pub use history::{UsageIndex, UsageRecord, SECONDS_PER_HOUR};
