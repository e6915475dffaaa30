//! # Configuration
//!
//! Manages the user configuration stored in `~/.config/fsearch/config.json`.
//!
//! ## Overview
//!
//! The on-disk shape is [`ConfigFile`]. It is validated once into a [`Config`]
//! holding typed [`RootSpec`]s and the loaded [`UsageIndex`]; nothing
//! downstream looks at raw JSON.
//!
//! ## File Format
//!
//! ```json
//! {
//!   "z_jump_file": "${HOME}/.z",
//!   "walker": "native",
//!   "project_roots": [
//!     { "path": "${HOME}", "min": 1, "max": 2,
//!       "search": { "type": "d", "iname": ".git" }, "parent": true }
//!   ]
//! }
//! ```
//!
//! A missing file means no roots and no usage history.
//!
//! ## File Location
//!
//! The `directories` crate is used to resolve the platform-appropriate config
//! directory.

use crate::error::ConfigError;
use crate::search::Filter;
use crate::template::TemplateResolver;
use crate::usage::UsageIndex;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Which [`TreeWalker`](crate::search::TreeWalker) runs the searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalkerKind {
    #[default]
    Native,
    Find,
}

/// One `project_roots` entry as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootEntry {
    /// Path template, e.g. `~/src` or `${WORK}`.
    pub path: String,

    /// `find`-style filters; empty means directories only.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub search: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,

    /// Report the parent directory of each match instead of the match.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub parent: bool,
}

/// Persisted configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Usage history in `z` format, as a path template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_jump_file: Option<String>,

    #[serde(default)]
    pub walker: WalkerKind,

    #[serde(default)]
    pub project_roots: Vec<RootEntry>,
}

impl ConfigFile {
    /// The configuration written by `fsearch conf --write`: every git
    /// checkout up to two levels below the home directory.
    pub fn initial() -> Self {
        Self {
            z_jump_file: Some("${HOME}/.z".to_string()),
            walker: WalkerKind::Native,
            project_roots: vec![RootEntry {
                path: "${HOME}".to_string(),
                search: BTreeMap::from([
                    ("type".to_string(), "d".to_string()),
                    ("iname".to_string(), ".git".to_string()),
                ]),
                min: Some(1),
                max: Some(2),
                parent: true,
            }],
        }
    }

    /// Load configuration from a specific path. Returns an empty
    /// configuration if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save the configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = self.to_pretty_json()?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        json.push('\n');
        Ok(json)
    }
}

/// Return the default path to the config file.
pub fn default_config_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "fsearch")
        .context("Could not determine config directory")?;
    Ok(dirs.config_dir().join("config.json"))
}

/// A validated search root.
#[derive(Debug, Clone)]
pub struct RootSpec {
    pub path_template: String,
    /// Never empty; defaults to directories only.
    pub filters: Vec<Filter>,
    pub min_depth: Option<usize>,
    pub max_depth: Option<usize>,
    pub report_parent: bool,
}

impl TryFrom<&RootEntry> for RootSpec {
    type Error = ConfigError;

    fn try_from(entry: &RootEntry) -> Result<Self, ConfigError> {
        if entry.path.trim().is_empty() {
            return Err(ConfigError::EmptyRootPath);
        }

        if let (Some(min), Some(max)) = (entry.min, entry.max) {
            if min > max {
                return Err(ConfigError::DepthRange { min, max });
            }
        }

        let mut filters = entry
            .search
            .iter()
            .map(|(key, value)| Filter::parse(key, value))
            .collect::<Result<Vec<_>, _>>()?;
        if filters.is_empty() {
            filters.push(Filter::directories());
        }

        Ok(Self {
            path_template: entry.path.clone(),
            filters,
            min_depth: entry.min,
            max_depth: entry.max,
            report_parent: entry.parent,
        })
    }
}

/// Everything one run needs, built once at startup and then read-only.
#[derive(Debug, Default)]
pub struct Config {
    pub root_specs: Vec<RootSpec>,
    pub usage_index: UsageIndex,
    pub walker: WalkerKind,
}

impl Config {
    /// Validate a config file and load the usage history it points at.
    pub fn from_file(
        file: &ConfigFile,
        resolver: &TemplateResolver,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let mut root_specs = Vec::with_capacity(file.project_roots.len());
        for (i, entry) in file.project_roots.iter().enumerate() {
            // Blank paths are skipped, not rejected
            if entry.path.trim().is_empty() {
                warn!(root = i + 1, "Skipping project root with an empty path");
                continue;
            }
            let spec = RootSpec::try_from(entry)
                .with_context(|| format!("Invalid project root #{} ('{}')", i + 1, entry.path))?;
            root_specs.push(spec);
        }

        let usage_index = match &file.z_jump_file {
            Some(template) => UsageIndex::load(&resolver.resolve(template), resolver, now)?,
            None => UsageIndex::default(),
        };

        Ok(Self {
            root_specs,
            usage_index,
            walker: file.walker,
        })
    }

    /// Read, validate and load everything from a config path.
    pub fn load(path: &Path, resolver: &TemplateResolver, now: DateTime<Utc>) -> Result<Self> {
        let file = ConfigFile::load_from(path)?;
        Self::from_file(&file, resolver, now)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::EntryKind;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn resolver(home: &Path) -> TemplateResolver {
        let vars = HashMap::from([("HOME".to_string(), home.display().to_string())]);
        TemplateResolver::new(Some(home.to_path_buf()), home.to_path_buf(), vars).unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_deserialize_root_entry_defaults() {
        let entry: RootEntry = serde_json::from_str(r#"{"path": "~/src"}"#).unwrap();
        assert_eq!(entry.path, "~/src");
        assert!(entry.search.is_empty());
        assert_eq!(entry.min, None);
        assert_eq!(entry.max, None);
        assert!(!entry.parent);
    }

    #[test]
    fn test_deny_unknown_fields() {
        let json = r#"{"project_roots": [{"path": "~", "depth": 3}]}"#;
        let result: Result<ConfigFile, _> = serde_json::from_str(json);
        assert!(result.is_err(), "should reject unknown fields");
    }

    #[test]
    fn test_walker_kind_parses_lowercase() {
        let file: ConfigFile = serde_json::from_str(r#"{"walker": "find"}"#).unwrap();
        assert_eq!(file.walker, WalkerKind::Find);
        let file: ConfigFile = serde_json::from_str("{}").unwrap();
        assert_eq!(file.walker, WalkerKind::Native);
    }

    #[test]
    fn test_root_spec_defaults_to_directories() {
        let spec = RootSpec::try_from(&RootEntry {
            path: "~".to_string(),
            ..RootEntry::default()
        })
        .unwrap();
        assert_eq!(spec.filters.len(), 1);
        assert!(matches!(spec.filters[0], Filter::Kind(EntryKind::Directory)));
        assert!(!spec.report_parent);
    }

    #[test]
    fn test_root_spec_rejects_bad_entries() {
        let empty = RootEntry::default();
        assert!(matches!(
            RootSpec::try_from(&empty),
            Err(ConfigError::EmptyRootPath)
        ));

        let inverted = RootEntry {
            path: "~".to_string(),
            min: Some(3),
            max: Some(1),
            ..RootEntry::default()
        };
        assert!(matches!(
            RootSpec::try_from(&inverted),
            Err(ConfigError::DepthRange { min: 3, max: 1 })
        ));

        let unknown = RootEntry {
            path: "~".to_string(),
            search: BTreeMap::from([("mtime".to_string(), "-1".to_string())]),
            ..RootEntry::default()
        };
        assert!(matches!(
            RootSpec::try_from(&unknown),
            Err(ConfigError::UnknownFilter(_))
        ));
    }

    #[test]
    fn test_initial_config_is_valid() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_file(&ConfigFile::initial(), &resolver(temp_dir.path()), now())
            .unwrap();
        assert_eq!(config.root_specs.len(), 1);
        assert!(config.root_specs[0].report_parent);
        // ${HOME}/.z doesn't exist in the temp home
        assert!(config.usage_index.is_empty());
    }

    #[test]
    fn test_save_to_load_from_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("subdir").join("config.json");

        let config = ConfigFile::initial();
        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("does_not_exist.json");

        let config = Config::load(&config_path, &resolver(temp_dir.path()), now()).unwrap();
        assert!(config.root_specs.is_empty());
        assert!(config.usage_index.is_empty());
        assert_eq!(config.walker, WalkerKind::Native);
    }

    #[test]
    fn test_load_reads_history_file() {
        let temp_dir = TempDir::new().unwrap();
        let home = temp_dir.path();
        fs::write(
            home.join(".z"),
            format!("{}|4|{}\n", home.join("app").display(), 1_700_000_000 - 3600),
        )
        .unwrap();
        let config_path = home.join("config.json");
        fs::write(
            &config_path,
            r#"{"z_jump_file": "${HOME}/.z", "project_roots": [{"path": "${HOME}"}]}"#,
        )
        .unwrap();

        let config = Config::load(&config_path, &resolver(home), now()).unwrap();
        assert_eq!(config.root_specs.len(), 1);
        let record = config
            .usage_index
            .get(&home.join("app").display().to_string())
            .unwrap();
        assert_eq!(record.rank, 4.0);
    }

    #[test]
    fn test_empty_root_path_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let file: ConfigFile = serde_json::from_str(
            r#"{"project_roots": [{"path": ""}, {"path": "  "}, {"path": "~/src"}]}"#,
        )
        .unwrap();

        let config = Config::from_file(&file, &resolver(temp_dir.path()), now()).unwrap();
        assert_eq!(config.root_specs.len(), 1);
        assert_eq!(config.root_specs[0].path_template, "~/src");
    }

    #[test]
    fn test_invalid_root_reports_position() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{"project_roots": [{"path": "~"}, {"path": "~", "search": {"type": "q"}}]}"#,
        )
        .unwrap();

        let result = Config::load(&config_path, &resolver(temp_dir.path()), now());
        let err_msg = format!("{:#}", result.unwrap_err());
        assert!(err_msg.contains("#2"));
        assert!(err_msg.contains("invalid entry type 'q'"));
    }
}
