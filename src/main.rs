//! Tagscope CLI application entry point
//!
//! Indexes the documents below a vault root and answers tag queries over
//! them. The index is built fresh on every invocation.
//!
//! # Usage
//!
//! ```bash
//! # Lines tagged #todo but not #done, anywhere in the vault
//! tagscope --vault ~/notes query "#todo -#done"
//!
//! # Either of two projects, or anything in the current note
//! tagscope query "#project/alpha | #project/beta | doc:current" --current plan.md
//!
//! # Date range over inline date tags
//! tagscope query "range:#today-7..#today"
//!
//! # Tag listing, and tags of one line
//! tagscope tags --min-count 2
//! tagscope at plan.md 14
//!
//! # Quiet mode (only output results)
//! tagscope -q tags
//! ```
//!
//! # Configuration
//!
//! Settings are read from the user's config directory
//! (`~/.config/tagscope/config.toml` on Linux) and `TAGSCOPE_*` environment
//! variables. `tagscope config --init` writes the current settings there.

use std::sync::Arc;

use tagscope::{
    FsSource, QueryEvaluator, SharedIndex, TagIndex, TagscopeError,
    cli::{Cli, Commands, OutputFormat, read_query},
    config::TagscopeConfig,
    index::{IndexError, Indexer},
    materialize, output,
    source::{refresh_document, sync_source_with_threads},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, TagscopeError>;

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_source(config: &TagscopeConfig) -> Result<FsSource> {
    let root = match &config.vault {
        Some(vault) => vault.clone(),
        None => std::env::current_dir()?,
    };
    Ok(FsSource::new(root, &config.document_glob)?)
}

fn empty_index(config: &TagscopeConfig) -> SharedIndex {
    let indexer = Indexer::new(Arc::new(config.pattern_config()));
    SharedIndex::new(TagIndex::with_indexer(indexer))
}

/// Index every document the source holds
fn index_vault(config: &TagscopeConfig, source: &FsSource) -> Result<SharedIndex> {
    let index = empty_index(config);
    let report = sync_source_with_threads(&index, source, config.page_size, config.index_threads)?;
    info!(
        root = %source.root().display(),
        documents = report.indexed,
        pages = report.pages,
        "vault indexed"
    );
    Ok(index)
}

/// Index a single document, failing if the source does not have it
fn index_one(config: &TagscopeConfig, source: &FsSource, document: &str) -> Result<SharedIndex> {
    let index = empty_index(config);
    if !refresh_document(&index, source, document)? {
        return Err(IndexError::DocumentNotFound(document.to_string()).into());
    }
    debug!(document, "document indexed");
    Ok(index)
}

fn handle_query_command(
    index: &SharedIndex,
    query_text: &str,
    json: bool,
    current: Option<&str>,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let query = read_query(query_text, json)?;
    debug!(query = %query, "evaluating query");

    let snapshot = index.read()?;
    let results = QueryEvaluator::new(&snapshot).evaluate(&query, current);
    let matches = materialize::materialize(&results, &snapshot);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        if !quiet {
            println!("{}", output::no_matches());
        }
        return Ok(());
    }

    for (position, document) in matches.iter().enumerate() {
        if position > 0 && !quiet {
            println!();
        }
        println!("{}", output::document_header(document, quiet));
        for block in &document.blocks {
            println!("{}", output::match_block(block, quiet));
        }
    }

    if !quiet {
        let blocks: usize = matches.iter().map(|m| m.blocks.len()).sum();
        println!("\n{blocks} block(s) in {} document(s)", matches.len());
    }
    Ok(())
}

fn handle_tags_command(index: &SharedIndex, min_count: usize, quiet: bool) -> Result<()> {
    let snapshot = index.read()?;
    let counts = snapshot.tag_counts_with_min(snapshot.patterns().value_delimiter(), min_count);

    if counts.is_empty() {
        if !quiet {
            println!("No tags found in {} document(s)", snapshot.len());
        }
        return Ok(());
    }

    if !quiet {
        println!("Tags in {} document(s):", snapshot.len());
    }
    for (tag, count) in &counts {
        println!("{}", output::tag_with_count(tag, *count, quiet));
    }
    Ok(())
}

fn handle_at_command(index: &SharedIndex, document: &str, line: usize, quiet: bool) -> Result<()> {
    let Some(line_index) = line.checked_sub(1) else {
        return Err(TagscopeError::InvalidInput("Line numbers start at 1".into()));
    };

    let snapshot = index.read()?;
    let tags = snapshot.tags_at_line(document, line_index)?;

    if tags.is_empty() {
        if !quiet {
            println!("No tags on line {line} of {document}");
        }
        return Ok(());
    }

    if !quiet {
        println!("Tags on line {line} of {document}:");
    }
    for tag in &tags {
        println!("{}", if quiet { tag.clone() } else { format!("  #{tag}") });
    }
    Ok(())
}

fn handle_show_command(index: &SharedIndex, document: &str, quiet: bool) -> Result<()> {
    let snapshot = index.read()?;
    let tags = snapshot
        .tags_of(document)
        .ok_or_else(|| IndexError::DocumentNotFound(document.to_string()))?;

    if tags.is_empty() {
        if !quiet {
            println!("{document} has no tags");
        }
        return Ok(());
    }

    if !quiet {
        println!("Tags of {document}:");
    }
    for (tag, occurrences) in tags {
        println!("{}", output::tag_with_lines(tag, occurrences, quiet));
    }
    Ok(())
}

fn handle_config_command(config: &TagscopeConfig, init: bool, quiet: bool) -> Result<()> {
    if init {
        let path = config.save()?;
        if !quiet {
            println!("Configuration written to {}", path.display());
        }
        return Ok(());
    }

    let rendered = toml::to_string_pretty(config)
        .map_err(|e| TagscopeError::InvalidInput(format!("Failed to serialize config: {e}")))?;
    print!("{rendered}");
    Ok(())
}

/// Main entry point for the tagscope application
///
/// Loads configuration, parses command-line arguments, and dispatches to the
/// appropriate command handler.
///
/// # Errors
///
/// Returns `TagscopeError` if configuration loading fails, the vault cannot be
/// read, a query is malformed, or a document is unknown.
fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let mut config = match &cli.config {
        Some(path) => TagscopeConfig::load_from(path)?,
        None => TagscopeConfig::load()?,
    };
    cli.apply_to(&mut config);
    init_logging(&config.log_level);

    let quiet = config.quiet;

    match &cli.command {
        Commands::Query { query, json, current, format } => {
            let source = open_source(&config)?;
            let index = index_vault(&config, &source)?;
            handle_query_command(&index, query, *json, current.as_deref(), *format, quiet)?;
        }
        Commands::Tags { .. } => {
            let source = open_source(&config)?;
            let index = index_vault(&config, &source)?;
            handle_tags_command(&index, config.min_count, quiet)?;
        }
        Commands::At { document, line } => {
            let source = open_source(&config)?;
            let index = index_one(&config, &source, document)?;
            handle_at_command(&index, document, *line, quiet)?;
        }
        Commands::Show { document } => {
            let source = open_source(&config)?;
            let index = index_one(&config, &source, document)?;
            handle_show_command(&index, document, quiet)?;
        }
        Commands::Config { init } => {
            handle_config_command(&config, *init, quiet)?;
        }
    }

    Ok(())
}
