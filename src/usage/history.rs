//! # History File Loader
//!
//! Parses `path|frequency|timestamp` lines into an index keyed by resolved
//! path. Malformed lines are logged and skipped; a later line for the same
//! path replaces an earlier one.

use crate::error::HistoryLineError;
use crate::template::TemplateResolver;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Shortest age a record can have, keeping `rank` finite for entries stamped
/// "now" or in the future.
const MIN_AGE_SECONDS: f64 = 1.0;

/// Usage statistics for one visited directory.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub resolved_path: String,
    pub frequency: f64,
    pub age_seconds: f64,
    pub rank: f64,
}

impl UsageRecord {
    pub fn new(resolved_path: impl Into<String>, frequency: f64, age_seconds: f64) -> Self {
        let age_seconds = age_seconds.max(MIN_AGE_SECONDS);
        Self {
            resolved_path: resolved_path.into(),
            frequency,
            age_seconds,
            rank: frequency * (SECONDS_PER_HOUR / age_seconds),
        }
    }
}

/// Usage records keyed by resolved absolute path.
#[derive(Debug, Clone, Default)]
pub struct UsageIndex {
    records: HashMap<String, UsageRecord>,
}

impl UsageIndex {
    /// Load a history file. A missing file is an empty index.
    pub fn load(path: &Path, resolver: &TemplateResolver, now: DateTime<Utc>) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No usage history file");
            return Ok(Self::default());
        }

        let contents = fs::read(path)
            .with_context(|| format!("Failed to read usage history: {}", path.display()))?;

        Ok(Self::parse_bytes(&contents, resolver, now))
    }

    /// Parse history file contents.
    pub fn parse(contents: &str, resolver: &TemplateResolver, now: DateTime<Utc>) -> Self {
        Self::parse_bytes(contents.as_bytes(), resolver, now)
    }

    /// Parse raw history bytes. Each line is decoded on its own, so a line
    /// that isn't UTF-8 is skipped like any other malformed line.
    pub fn parse_bytes(contents: &[u8], resolver: &TemplateResolver, now: DateTime<Utc>) -> Self {
        let now_secs = now.timestamp_millis() as f64 / 1000.0;
        let mut index = Self::default();

        for (i, raw) in contents.split(|&b| b == b'\n').enumerate() {
            if raw.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let record = std::str::from_utf8(raw)
                .map_err(|_| HistoryLineError::NotUtf8)
                .and_then(|line| parse_line(line, resolver, now_secs));
            match record {
                Ok(record) => index.insert(record),
                Err(err) => warn!(line = i + 1, error = %err, "Skipping malformed usage history line"),
            }
        }

        index
    }

    pub fn insert(&mut self, record: UsageRecord) {
        self.records.insert(record.resolved_path.clone(), record);
    }

    pub fn get(&self, resolved_path: &str) -> Option<&UsageRecord> {
        self.records.get(resolved_path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_line(
    line: &str,
    resolver: &TemplateResolver,
    now_secs: f64,
) -> Result<UsageRecord, HistoryLineError> {
    // Split from the right so a '|' inside the path survives
    let mut fields = line.trim_end_matches('\r').rsplitn(3, '|');
    let (Some(timestamp), Some(frequency), Some(path)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(HistoryLineError::MissingFields);
    };

    let frequency: f64 = frequency
        .trim()
        .parse()
        .ok()
        .filter(|f: &f64| f.is_finite() && *f >= 0.0)
        .ok_or_else(|| HistoryLineError::InvalidFrequency(frequency.to_string()))?;

    let timestamp: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| HistoryLineError::InvalidTimestamp(timestamp.to_string()))?;

    Ok(UsageRecord::new(
        resolver.resolve_str(path),
        frequency,
        now_secs - timestamp as f64,
    ))
}
