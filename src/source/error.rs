//! Document source errors

use std::path::PathBuf;

use thiserror::Error;

use crate::index::IndexError;

/// Failures while fetching documents or feeding them to the index
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading a document failed
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document selection pattern is invalid
    #[error("Invalid document pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A directory entry could not be read while listing documents
    #[error("Failed to list documents: {0}")]
    Listing(#[from] glob::GlobError),

    /// Id does not name a document inside the source
    #[error("Invalid document id: {0}")]
    InvalidId(String),

    /// Source root does not exist or is not a directory
    #[error("Document root not found: {0}")]
    RootNotFound(PathBuf),

    /// Applying fetched documents to the index failed
    #[error(transparent)]
    Index(#[from] IndexError),
}

impl SourceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
