//! Thread-safe handle to a [`TagIndex`]
//!
//! Readers hold a read guard for the duration of a query and so observe one
//! consistent snapshot. Batch writers scan outside the lock and only take
//! the write guard to apply finished results; single-document updates scan
//! under the write guard so they apply in lock order.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use super::{IndexError, Indexer, TagIndex};
use crate::document::Document;

/// Cloneable shared index
#[derive(Debug, Clone, Default)]
pub struct SharedIndex(Arc<RwLock<TagIndex>>);

impl SharedIndex {
    #[must_use]
    pub fn new(index: TagIndex) -> Self {
        Self(Arc::new(RwLock::new(index)))
    }

    /// Acquire a read snapshot
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Poisoned` if a writer panicked.
    pub fn read(&self) -> Result<RwLockReadGuard<'_, TagIndex>, IndexError> {
        self.0.read().map_err(|_| IndexError::Poisoned)
    }

    /// Acquire the single writer
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Poisoned` if a writer panicked.
    pub fn write(&self) -> Result<RwLockWriteGuard<'_, TagIndex>, IndexError> {
        self.0.write().map_err(|_| IndexError::Poisoned)
    }

    /// Copy of the indexer, usable without holding any lock
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Poisoned` if a writer panicked.
    pub fn indexer(&self) -> Result<Indexer, IndexError> {
        Ok(self.read()?.indexer().clone())
    }

    /// Scan `documents` on up to `threads` workers and apply them in one write
    ///
    /// Returns the number of documents applied. Scanning happens before the
    /// write guard is taken, so a batch racing another update of the same id
    /// may land after it. Callers must serialize updates per id.
    ///
    /// # Errors
    ///
    /// Returns `IndexError` if the lock is poisoned or the pool cannot start.
    pub fn index_documents(&self, documents: Vec<Document>, threads: usize) -> Result<usize, IndexError> {
        let scanned = self.indexer()?.scan_all_with_threads(documents, threads)?;
        let applied = scanned.len();

        let mut index = self.write()?;
        for doc in scanned {
            index.insert(doc);
        }
        info!(documents = applied, "applied scanned batch");
        Ok(applied)
    }

    /// Scan and apply one document under the write guard
    ///
    /// Concurrent updates of the same id apply in the order they acquire the
    /// lock, so the last writer's text always wins.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Poisoned` if a writer panicked.
    pub fn index_document(&self, document: Document) -> Result<(), IndexError> {
        self.write()?.index_document(document);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `IndexError::Poisoned` if a writer panicked.
    pub fn remove_document(&self, id: &str) -> Result<bool, IndexError> {
        Ok(self.write()?.remove_document(id))
    }
}
