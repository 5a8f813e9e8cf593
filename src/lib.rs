//! Tagscope - inline tag indexing and boolean tag queries over text documents
//!
//! Documents are scanned line by line for `#tags`, which may be nested
//! (`#project/alpha`), carry values (`#status=done`) or be inherited by
//! indented lines and by lines under a tagged heading. Front-matter keys
//! become tags too. The resulting inverted index answers DNF queries at line
//! granularity; matches are grouped into contiguous text blocks.
//!
//! ```
//! use tagscope::{Document, Query, QueryEvaluator, TagIndex, materialize};
//!
//! let mut index = TagIndex::default();
//! index.index_document(Document::new("plan.md", "# Plan\nship it #todo\n  write docs"));
//!
//! let query = Query::parse("#todo").unwrap();
//! let results = QueryEvaluator::new(&index).evaluate(&query, None);
//! let blocks = materialize::materialize(&results, &index);
//! assert_eq!(blocks[0].blocks[0].text, "ship it #todo\n  write docs");
//! ```

use thiserror::Error;

pub mod cli;
pub mod config;
pub mod document;
pub mod frontmatter;
pub mod index;
pub mod materialize;
pub mod output;
pub mod patterns;
pub mod query;
pub mod scanner;
pub mod source;
pub mod tags;

#[cfg(test)]
pub mod testing;

pub use document::{Document, DocumentId, DocumentTags, TagOccurrences};
pub use index::{IndexError, ResultSet, SearchField, SharedIndex, TagIndex};
pub use patterns::{PatternConfig, PatternSettings};
pub use query::{Query, QueryError, QueryEvaluator, QueryPart};
pub use scanner::TagScanner;
pub use source::{DocumentSource, FsSource, SourceError};

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum TagscopeError {
    /// Index error
    #[error("Index error: {0}")]
    IndexError(#[from] IndexError),
    /// Query rejected at the boundary
    #[error("Query error: {0}")]
    QueryError(#[from] QueryError),
    /// Document source error
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Output serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
