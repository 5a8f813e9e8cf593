//! Index error types
//!
//! Indexing itself never fails: scanning is total over any text. Errors only
//! arise around the index, when the shared lock is poisoned by a panicking
//! writer, when a worker pool cannot be built, or when a caller asks for a
//! document the index does not hold.

use thiserror::Error;

/// Index-specific errors
#[derive(Debug, Error)]
pub enum IndexError {
    /// A writer panicked while holding the index lock
    #[error("Index lock poisoned by a panicked writer")]
    Poisoned,

    /// Document id is not indexed
    #[error("Document not indexed: {0}")]
    DocumentNotFound(String),

    /// Scanning worker pool could not be started
    #[error("Failed to build scanning thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
