//! # Path Templates
//!
//! Project roots are configured as *templates*: path strings that may embed
//! environment variables (`$HOME`, `${PROJECTS}`) and a leading `~`. The same
//! template is used twice:
//!
//! 1. [`TemplateResolver::resolve`] expands it into an absolute path to search.
//! 2. [`TemplateResolver::unresolve`] puts the template back in front of every
//!    match, so `/home/me/src/app` is displayed as `~/src/app`.
//!
//! Unset variables and malformed references are left in place verbatim.

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::env;
use std::path::{Component, Path, PathBuf};

/// Expands and collapses path templates against a fixed environment.
///
/// Built once per run (see [`TemplateResolver::from_env`]) and handed around
/// by reference.
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    home: Option<PathBuf>,
    cwd: PathBuf,
    vars: HashMap<String, String>,
    var_re: Regex,
}

impl TemplateResolver {
    /// Create a resolver with an explicit home directory, working directory
    /// and variable table.
    pub fn new(home: Option<PathBuf>, cwd: PathBuf, vars: HashMap<String, String>) -> Result<Self> {
        let var_re = Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
            .context("Failed to compile variable regex pattern")?;

        Ok(Self {
            home,
            cwd,
            vars,
            var_re,
        })
    }

    /// Capture the current process environment.
    pub fn from_env() -> Result<Self> {
        let cwd = env::current_dir().context("Failed to get current working directory")?;
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());

        // Non-UTF-8 variables can't appear in a JSON template anyway
        let vars = env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();

        Self::new(home, cwd, vars)
    }

    /// Expand a template into an absolute, lexically normalized path.
    pub fn resolve(&self, template: &str) -> PathBuf {
        let expanded = self.expand_home(&self.expand_vars(template));
        let path = Path::new(&expanded);

        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.cwd.join(path))
        }
    }

    /// [`resolve`](Self::resolve), rendered as a string.
    pub fn resolve_str(&self, template: &str) -> String {
        self.resolve(template).to_string_lossy().into_owned()
    }

    /// Replace the expansion of `template` at the start of `path` with the
    /// template itself. Paths outside the template are returned unchanged.
    pub fn unresolve(&self, template: &str, path: &str) -> String {
        let expansion = self.resolve_str(template);

        match path.strip_prefix(expansion.as_str()) {
            Some(rest) => {
                let rest = if template.ends_with('/') {
                    rest.strip_prefix('/').unwrap_or(rest)
                } else {
                    rest
                };
                format!("{template}{rest}")
            }
            None => path.to_string(),
        }
    }

    fn expand_vars(&self, template: &str) -> String {
        self.var_re
            .replace_all(template, |caps: &Captures| {
                let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
                self.vars
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn expand_home(&self, path: &str) -> String {
        let Some(home) = &self.home else {
            return path.to_string();
        };

        if path == "~" {
            home.to_string_lossy().into_owned()
        } else if let Some(rest) = path.strip_prefix("~/") {
            home.join(rest).to_string_lossy().into_owned()
        } else {
            path.to_string()
        }
    }
}

/// Drop `.` components and fold `..` into its parent without touching the
/// filesystem, so symlinked roots keep their configured spelling.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }

    out
}
