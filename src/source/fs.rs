//! Documents read from a directory tree
//!
//! Ids are paths relative to the root with `/` separators
//! (`projects/plan.md`), selected by a glob such as `**/*.md`.

use std::fs;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};

use super::{DocumentSource, Page, SourceError};
use crate::document::{Document, DocumentId};

/// Default document selection
pub const DEFAULT_DOCUMENT_GLOB: &str = "**/*.md";

/// Filesystem-backed [`DocumentSource`]
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
    pattern: Pattern,
}

impl FsSource {
    /// Source over `root` selecting files that match `pattern`
    ///
    /// # Errors
    ///
    /// Returns `SourceError::RootNotFound` if `root` is not a directory and
    /// `SourceError::Pattern` if `pattern` is not a valid glob.
    pub fn new(root: impl Into<PathBuf>, pattern: &str) -> Result<Self, SourceError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SourceError::RootNotFound(root));
        }
        let root = root.canonicalize().map_err(|e| SourceError::io(&root, e))?;
        Ok(Self { root, pattern: Pattern::new(pattern)? })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ids of every matching file, sorted
    ///
    /// Each call lists the directory again, so pages reflect files added or
    /// removed between calls.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if the tree cannot be listed.
    pub fn list_ids(&self) -> Result<Vec<DocumentId>, SourceError> {
        let full = format!("{}/{}", Pattern::escape(&self.root.to_string_lossy()), self.pattern.as_str());
        let mut ids = Vec::new();
        for entry in glob::glob_with(&full, MatchOptions::new())? {
            let path = entry?;
            if !path.is_file() {
                continue;
            }
            match self.id_of(&path) {
                Some(id) => ids.push(id),
                None => warn!(path = %path.display(), "skipping path outside document root"),
            }
        }
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    fn id_of(&self, path: &Path) -> Option<DocumentId> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }

    /// Path of `id`, refusing ids that would leave the root
    fn path_of(&self, id: &str) -> Result<PathBuf, SourceError> {
        let relative = Path::new(id);
        let inside = !id.is_empty()
            && relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !inside {
            return Err(SourceError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Read a document; invalid UTF-8 is replaced rather than rejected
    fn read(&self, id: DocumentId, path: &Path) -> Result<Document, SourceError> {
        let bytes = fs::read(path).map_err(|e| SourceError::io(path, e))?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(id = %id, "document is not valid UTF-8, replacing invalid bytes");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(Document::new(id, text))
    }
}

impl DocumentSource for FsSource {
    fn fetch_document(&self, id: &str) -> Result<Option<Document>, SourceError> {
        let path = self.path_of(id)?;
        if !path.is_file() || !self.pattern.matches(id) {
            debug!(id, "document not in source");
            return Ok(None);
        }
        self.read(id.to_string(), &path).map(Some)
    }

    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Page, SourceError> {
        let ids = self.list_ids()?;
        let end = offset.saturating_add(limit).min(ids.len());
        let start = offset.min(end);

        let documents = ids[start..end]
            .iter()
            .filter_map(|id| {
                let read = self.path_of(id).and_then(|path| self.read(id.clone(), &path));
                match read {
                    Ok(document) => Some(document),
                    Err(e) => {
                        warn!(id = %id, error = %e, "skipping unreadable document");
                        None
                    }
                }
            })
            .collect();

        let next = (end < ids.len()).then_some(end);
        Ok(Page { documents, next })
    }
}
