//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for tagscope using the `clap` crate.
//! Every command except `config` works on the documents below the vault
//! root, indexed fresh for each invocation.
//!
//! # Commands
//!
//! - **query**: Print the blocks matching a tag query
//! - **tags**: List tags with their occurrence counts
//! - **at**: Show the tags applying to one line of a document
//! - **show**: Show every tag of a document with its lines
//! - **config**: Print or initialize the configuration file
//!
//! # Examples
//!
//! ```
//! use clap::Parser;
//! use tagscope::cli::{Cli, Commands};
//!
//! let cli = Cli::parse_from(["tagscope", "--vault", "notes", "query", "#todo -#done"]);
//! assert!(matches!(cli.command, Commands::Query { .. }));
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::TagscopeConfig;
use crate::query::{Query, QueryError};

/// How query results are printed
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Numbered text blocks grouped by document
    #[default]
    Text,
    /// Materialized matches as JSON
    Json,
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "tagscope")]
#[command(about = "Inline tag index and boolean tag queries over text documents", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Document root (overrides config, defaults to the current directory)
    #[arg(long = "vault", value_name = "DIR", global = true)]
    pub vault: Option<PathBuf>,

    /// Glob selecting documents below the root (overrides config)
    #[arg(long = "glob", value_name = "PATTERN", global = true)]
    pub glob: Option<String>,

    /// Configuration file to read instead of the default location
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set (e.g. `info`, `tagscope=debug`)
    #[arg(long = "log-level", value_name = "FILTER", global = true)]
    pub log_level: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the text blocks matching a query
    #[command(visible_alias = "q")]
    Query {
        /// Query text, e.g. `#project -#done | doc:current`
        #[arg(value_name = "QUERY")]
        query: String,

        /// Read the query in its JSON form
        #[arg(long = "json")]
        json: bool,

        /// Document that `doc:current` refers to
        #[arg(short = 'c', long = "current", value_name = "DOC")]
        current: Option<String>,

        /// Output format
        #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List tags with their literal occurrence counts
    #[command(visible_alias = "t")]
    Tags {
        /// Hide tags seen fewer times (overrides config)
        #[arg(short = 'm', long = "min-count", value_name = "N")]
        min_count: Option<usize>,
    },

    /// Show the tags applying to a line (1-based)
    At {
        /// Document id relative to the vault root
        #[arg(value_name = "DOC")]
        document: String,

        #[arg(value_name = "LINE")]
        line: usize,
    },

    /// Show every tag of a document with the lines it applies to
    Show {
        /// Document id relative to the vault root
        #[arg(value_name = "DOC")]
        document: String,
    },

    /// Print the effective configuration
    Config {
        /// Write the effective configuration to the user config file
        #[arg(long = "init")]
        init: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply global flag overrides on top of a loaded configuration
    pub fn apply_to(&self, config: &mut TagscopeConfig) {
        if let Some(vault) = &self.vault {
            config.vault = Some(vault.clone());
        }
        if let Some(glob) = &self.glob {
            config.document_glob.clone_from(glob);
        }
        if let Some(level) = &self.log_level {
            config.log_level.clone_from(level);
        }
        if let Commands::Tags { min_count: Some(min_count) } = &self.command {
            config.min_count = *min_count;
        }
        config.quiet = config.quiet || self.quiet;
    }
}

/// Parse a query given on the command line in text or JSON form
///
/// # Errors
///
/// Returns `QueryError` if the query is malformed.
pub fn read_query(text: &str, json: bool) -> Result<Query, QueryError> {
    if json { Query::from_json(text) } else { Query::parse(text) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryPart;

    #[test]
    fn test_parse_query_command() {
        let cli = Cli::parse_from(["tagscope", "query", "#a -#b", "--current", "x.md"]);
        match cli.command {
            Commands::Query { query, json, current, format } => {
                assert_eq!(query, "#a -#b");
                assert!(!json);
                assert_eq!(current.as_deref(), Some("x.md"));
                assert_eq!(format, OutputFormat::Text);
            }
            _ => panic!("Expected Query command"),
        }
    }

    #[test]
    fn test_parse_alias_and_format() {
        let cli = Cli::parse_from(["tagscope", "q", "#a", "-f", "json"]);
        assert!(matches!(cli.command, Commands::Query { format: OutputFormat::Json, .. }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tagscope", "tags", "--vault", "/notes", "-q", "-m", "2"]);
        assert!(cli.quiet);
        assert_eq!(cli.vault, Some(PathBuf::from("/notes")));
        assert!(matches!(cli.command, Commands::Tags { min_count: Some(2) }));
    }

    #[test]
    fn test_parse_at() {
        let cli = Cli::parse_from(["tagscope", "at", "notes/a.md", "12"]);
        match cli.command {
            Commands::At { document, line } => {
                assert_eq!(document, "notes/a.md");
                assert_eq!(line, 12);
            }
            _ => panic!("Expected At command"),
        }
        assert!(Cli::try_parse_from(["tagscope", "at", "a.md", "x"]).is_err());
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["tagscope"]).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::parse_from([
            "tagscope", "--vault", "/v", "--glob", "*.txt", "--log-level", "debug", "tags", "-m", "3",
        ]);
        let mut config = TagscopeConfig::default();
        cli.apply_to(&mut config);

        assert_eq!(config.vault, Some(PathBuf::from("/v")));
        assert_eq!(config.document_glob, "*.txt");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.min_count, 3);
        assert!(!config.quiet);
    }

    #[test]
    fn test_apply_keeps_config_without_flags() {
        let cli = Cli::parse_from(["tagscope", "show", "a.md"]);
        let mut config = TagscopeConfig { quiet: true, min_count: 5, ..Default::default() };
        cli.apply_to(&mut config);

        assert!(config.quiet);
        assert_eq!(config.min_count, 5);
        assert!(config.vault.is_none());
    }

    #[test]
    fn test_read_query() {
        let text = read_query("#a", false).unwrap();
        let json = read_query(r#"[[{"tag": "a"}]]"#, true).unwrap();
        assert_eq!(text, json);
        assert_eq!(text.clauses()[0][0], QueryPart::tag("a"));
        assert!(read_query("[[", true).is_err());
    }
}
