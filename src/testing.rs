//! Testing utilities for tagscope
//!
//! This module provides helper types and functions for writing tests,
//! including a `TestVault` wrapper for temporary document trees and small
//! index builders.
//!
//! Only available when compiled with `cfg(test)`.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::document::Document;
use crate::index::TagIndex;

/// Temporary document directory that is removed on drop
///
/// # Examples
/// ```ignore
/// let vault = TestVault::new();
/// vault.write("notes/a.md", "#tag");
/// assert!(vault.path().join("notes/a.md").exists());
/// // Directory removed when vault is dropped
/// ```
pub struct TestVault {
    dir: TempDir,
}

impl TestVault {
    /// Create an empty vault
    ///
    /// # Panics
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self { dir: TempDir::new().expect("Failed to create test vault") }
    }

    /// Root directory of the vault
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `relative`, creating parent directories
    ///
    /// # Panics
    /// Panics if the file cannot be written.
    pub fn write(&self, relative: impl AsRef<Path>, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create vault directory");
        }
        fs::write(&path, content).expect("Failed to write vault file");
        path
    }

    /// Delete a file from the vault
    ///
    /// # Panics
    /// Panics if the file cannot be removed.
    pub fn remove(&self, relative: impl AsRef<Path>) {
        fs::remove_file(self.dir.path().join(relative)).expect("Failed to remove vault file");
    }
}

impl Default for TestVault {
    fn default() -> Self {
        Self::new()
    }
}

/// Index with default patterns holding `(id, text)` documents
#[must_use]
pub fn index_of(docs: &[(&str, &str)]) -> TagIndex {
    let mut index = TagIndex::default();
    for (id, text) in docs {
        index.index_document(Document::new(*id, *text));
    }
    index
}

/// Line set literal
#[must_use]
pub fn lines(lines: &[usize]) -> BTreeSet<usize> {
    lines.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_cleanup() {
        let path = {
            let vault = TestVault::new();
            let file = vault.write("a/b.md", "x");
            assert!(file.exists());
            vault.path().to_path_buf()
        };

        // Directory should be cleaned up after drop
        assert!(!path.exists());
    }

    #[test]
    fn test_vault_remove() {
        let vault = TestVault::new();
        let file = vault.write("a.md", "x");
        vault.remove("a.md");
        assert!(!file.exists());
    }

    #[test]
    fn test_index_of() {
        let index = index_of(&[("a.md", "#x"), ("b.md", "plain")]);
        assert_eq!(index.len(), 2);
        assert_eq!(lines(&[3, 1, 3]), BTreeSet::from([1, 3]));
    }
}
