//! # `find` Subprocess Walker
//!
//! Delegates traversal to `find -L`, reading one path per output line as the
//! process produces it. `find`'s own complaints (permission denied, broken
//! links) go to `/dev/null` so an unreadable subtree never aborts a listing.
//!
//! A request turns into an argument list like:
//!
//! ```text
//! find -L <root> -mindepth 1 -maxdepth 2 ( -path */.git ) -prune -o -type d -iname .git -print
//! ```

use super::{Filter, SearchRequest, TreeWalker, Walk};
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Split};
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::debug;

/// Walks directories by running an external `find` binary.
#[derive(Debug, Clone)]
pub struct FindWalker {
    program: OsString,
}

impl Default for FindWalker {
    fn default() -> Self {
        Self::new("find")
    }
}

impl FindWalker {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl TreeWalker for FindWalker {
    fn walk(&self, request: &SearchRequest) -> Result<Walk> {
        let args = find_args(request);
        debug!(program = ?self.program, ?args, "Spawning find");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| {
                format!(
                    "Failed to run '{}' to search {}",
                    self.program.to_string_lossy(),
                    request.root.display()
                )
            })?;

        let stdout = child
            .stdout
            .take()
            .context("Failed to capture find output")?;

        Ok(Box::new(FindOutput {
            child,
            lines: BufReader::new(stdout).split(b'\n'),
        }))
    }
}

/// Build the `find` command line for a request.
pub fn find_args(request: &SearchRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-L".into(), request.root.clone().into()];

    // Depth options go first; GNU find warns when they follow a test
    if let Some(min_depth) = request.min_depth {
        args.push("-mindepth".into());
        args.push(min_depth.to_string().into());
    }
    if let Some(max_depth) = request.max_depth {
        args.push("-maxdepth".into());
        args.push(max_depth.to_string().into());
    }

    if !request.prune.is_empty() {
        args.push("(".into());
        for (i, pattern) in request.prune.iter().enumerate() {
            if i > 0 {
                args.push("-o".into());
            }
            let test = if pattern.is_case_insensitive() { "-ipath" } else { "-path" };
            args.push(test.into());
            args.push(pattern.as_str().into());
        }
        args.push(")".into());
        args.push("-prune".into());
        args.push("-o".into());
    }

    for filter in &request.filters {
        let (test, value) = match filter {
            Filter::Kind(kind) => ("-type", kind.flag()),
            Filter::Name(p) if p.is_case_insensitive() => ("-iname", p.as_str()),
            Filter::Name(p) => ("-name", p.as_str()),
            Filter::Path(p) if p.is_case_insensitive() => ("-ipath", p.as_str()),
            Filter::Path(p) => ("-path", p.as_str()),
        };
        args.push(test.into());
        args.push(value.into());
    }

    // Without an explicit action the pruned entries would be printed too
    if !request.prune.is_empty() {
        args.push("-print".into());
    }

    args
}

/// Streams paths out of a running `find`; the process is reaped on drop.
struct FindOutput {
    child: Child,
    lines: Split<BufReader<ChildStdout>>,
}

impl Iterator for FindOutput {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            match self.lines.next()? {
                Ok(line) if line.is_empty() => continue,
                Ok(line) => return Some(PathBuf::from(String::from_utf8_lossy(&line).into_owned())),
                Err(err) => {
                    debug!(error = %err, "Failed to read find output");
                    return None;
                }
            }
        }
    }
}

impl Drop for FindOutput {
    fn drop(&mut self) {
        // Already exited when fully drained; kill only matters on early drop
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Pattern;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_find_args_for_project_root() {
        let request = SearchRequest::new("/srv/code")
            .with_filters(vec![
                Filter::parse("type", "d").unwrap(),
                Filter::parse("iname", ".git").unwrap(),
            ])
            .with_depth(Some(1), Some(2));

        assert_eq!(
            strings(&find_args(&request)),
            vec![
                "-L", "/srv/code", "-mindepth", "1", "-maxdepth", "2", "-type", "d", "-iname",
                ".git",
            ]
        );
    }

    #[test]
    fn test_find_args_with_prune() {
        let request = SearchRequest::new("/work")
            .with_filters(vec![Filter::parse("type", "f").unwrap()])
            .with_prune(vec![
                Pattern::new("*/.git", false).unwrap(),
                Pattern::new("*/NODE_MODULES", true).unwrap(),
            ]);

        assert_eq!(
            strings(&find_args(&request)),
            vec![
                "-L",
                "/work",
                "(",
                "-path",
                "*/.git",
                "-o",
                "-ipath",
                "*/NODE_MODULES",
                ")",
                "-prune",
                "-o",
                "-type",
                "f",
                "-print",
            ]
        );
    }

    #[test]
    fn test_find_args_without_filters() {
        let request = SearchRequest::new("/").with_depth(None, Some(1));
        assert_eq!(
            strings(&find_args(&request)),
            vec!["-L", "/", "-maxdepth", "1"]
        );
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let walker = FindWalker::new("fsearch-test-no-such-binary");
        let result = walker.walk(&SearchRequest::new("/"));
        assert!(result.is_err());
        let err_msg = format!("{:#}", result.err().unwrap());
        assert!(err_msg.contains("Failed to run"));
    }
}
