//! # fsearch CLI Entry Point
//!
//! This is the main entry point for the fsearch command line tool.
//!
//! ## Overview
//!
//! fsearch prints candidate directories one per line, for a fuzzy finder to
//! pick from. The `projects` listing searches the configured roots and puts
//! the directories you visit most, and most recently, first.
//!
//! ## Usage
//!
//! ```bash
//! # Jump to a project
//! cd "$(fsearch projects | fzf)"
//!
//! # Create ~/.config/fsearch/config.json with defaults
//! fsearch conf --write
//!
//! # Pick a file below the current directory
//! fsearch content-files | fzf
//! ```
//!
//! ## Architecture
//!
//! 1. **Config**: Loads project roots and the `z` usage history
//! 2. **Search**: Walks each root with its filters and depth bounds
//! 3. **Aggregate**: Merges results by display path
//! 4. **Rank**: Orders by frecency, then alphabetically
//! 5. **Output**: Streams lines to stdout, stopping quietly if the reader exits
//!
//! Logs go to stderr. Set `FSEARCH_LOG=debug` (or pass `-vv`) to see them.

use fsearch::aggregate::aggregate;
use fsearch::config::{self, Config, ConfigFile};
use fsearch::listing;
use fsearch::output;
use fsearch::rank::rank;
use fsearch::search::{self, ResultPath, RootSearcher};
use fsearch::template::TemplateResolver;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "FSEARCH_LOG";

/// fsearch - List project directories ranked by frecency
#[derive(Parser, Debug)]
#[command(name = "fsearch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "List directories for a fuzzy finder, most used first", long_about = None)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Path to the config file (default: ~/.config/fsearch/config.json)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log more to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// List project directories from the configured roots, ranked by frecency
    Projects {
        /// Accepted for older shell bindings; the fuzzy finder does the filtering
        #[arg(trailing_var_arg = true, hide = true)]
        prefilter: Vec<String>,
    },

    /// List the ancestors of the current directory
    ParentDirs,

    /// List entries of the current directory and each ancestor
    ParentFiles,

    /// List directories below the current directory
    ContentDirs,

    /// List files below the current directory
    ContentFiles,

    /// Print the default configuration, its location, or create it
    Conf {
        /// Create the config file with defaults if it doesn't exist
        #[arg(long, conflicts_with = "path")]
        write: bool,

        /// Print the config file location
        #[arg(long)]
        path: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    run_application(args)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_application(args: Args) -> Result<()> {
    let config_path = match args.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };

    match args.command {
        Command::Conf { write, path } => run_conf(&config_path, write, path),
        Command::Projects { .. } => {
            let resolver = TemplateResolver::from_env()?;
            let config = Config::load(&config_path, &resolver, Utc::now())?;
            let ordered = list_projects(&config, &resolver)?;
            write_stdout(ordered.iter().map(ResultPath::as_str))
        }
        Command::ParentDirs => {
            let cwd = current_dir()?;
            write_stdout(listing::parent_dirs(&cwd).iter().map(|p| p.to_string_lossy()))
        }
        Command::ParentFiles => {
            let walker = search::walker_for(ConfigFile::load_from(&config_path)?.walker);
            let files = listing::parent_files(&current_dir()?, walker.as_ref())?;
            write_stdout(files.map(|p| p.to_string_lossy().into_owned()))
        }
        Command::ContentDirs => {
            let walker = search::walker_for(ConfigFile::load_from(&config_path)?.walker);
            write_stdout(listing::content_dirs(&current_dir()?, walker.as_ref())?)
        }
        Command::ContentFiles => {
            let walker = search::walker_for(ConfigFile::load_from(&config_path)?.walker);
            write_stdout(listing::content_files(&current_dir()?, walker.as_ref())?)
        }
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to get current working directory")
}

/// Search every configured root and rank the merged result.
fn list_projects(config: &Config, resolver: &TemplateResolver) -> Result<Vec<ResultPath>> {
    let walker = search::walker_for(config.walker);
    let searcher = RootSearcher::new(walker.as_ref(), resolver);
    let found = aggregate(&config.root_specs, &searcher)?;

    Ok(rank(found, &config.usage_index, resolver))
}

fn run_conf(config_path: &Path, write: bool, show_path: bool) -> Result<()> {
    if show_path {
        return write_stdout([config_path.display().to_string()]);
    }

    if write {
        if config_path.exists() {
            eprintln!("Config already exists: {}", config_path.display());
        } else {
            ConfigFile::initial().save_to(config_path)?;
            eprintln!("Initialized Config...");
        }
        return Ok(());
    }

    let json = ConfigFile::initial().to_pretty_json()?;
    write_stdout([json.trim_end()])
}

/// Stream lines to stdout through the emitter, so a closed pipe is silent.
fn write_stdout<I, S>(lines: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    output::emit(lines, &mut out).context("Failed to write to stdout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_args_parsing_projects() {
        let args = Args::try_parse_from(["fsearch", "projects"]).unwrap();
        assert_eq!(args.command, Command::Projects { prefilter: vec![] });
        assert_eq!(args.config, None);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_args_projects_accepts_prefilter_words() {
        let args = Args::try_parse_from(["fsearch", "projects", "foo", "bar"]).unwrap();
        assert_eq!(
            args.command,
            Command::Projects {
                prefilter: vec!["foo".to_string(), "bar".to_string()]
            }
        );
    }

    #[test]
    fn test_args_parsing_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["fsearch", "content-dirs", "-vv", "--config", "/tmp/c.json"])
                .unwrap();
        assert_eq!(args.command, Command::ContentDirs);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.json")));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_args_conf_flags_conflict() {
        assert!(Args::try_parse_from(["fsearch", "conf", "--write", "--path"]).is_err());
        let args = Args::try_parse_from(["fsearch", "conf", "--path"]).unwrap();
        assert_eq!(
            args.command,
            Command::Conf {
                write: false,
                path: true
            }
        );
    }

    #[test]
    fn test_args_require_subcommand() {
        assert!(Args::try_parse_from(["fsearch"]).is_err());
    }

    #[test]
    fn test_run_conf_write_creates_file_once() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("fsearch").join("config.json");

        run_conf(&config_path, true, false).unwrap();
        let written = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(written, ConfigFile::initial());

        // Existing files are left alone
        fs::write(&config_path, "{}").unwrap();
        run_conf(&config_path, true, false).unwrap();
        assert_eq!(fs::read_to_string(&config_path).unwrap(), "{}");
    }

    #[test]
    fn test_run_application_rejects_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{"project_roots": [{"path": "~", "min": 3, "max": 1}]}"#,
        )
        .unwrap();

        let args = Args {
            config: Some(config_path),
            verbose: 0,
            command: Command::Projects { prefilter: vec![] },
        };
        let result = run_application(args);
        assert!(result.is_err());
        let err_msg = format!("{:#}", result.unwrap_err());
        assert!(err_msg.contains("min depth 3 is greater than max depth 1"));
    }
}
