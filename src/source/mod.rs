//! Where documents come from
//!
//! The index never assumes it holds the whole corpus. A [`DocumentSource`]
//! hands documents out one at a time or in pages, and [`sync_source`] /
//! [`refresh_document`] feed them into a [`SharedIndex`](crate::SharedIndex).

use std::collections::BTreeMap;

use crate::document::{Document, DocumentId};

pub mod error;
pub mod fs;
pub mod sync;

pub use error::SourceError;
pub use fs::FsSource;
pub use sync::{SyncReport, refresh_document, sync_source, sync_source_with_threads};

/// Default number of documents per page
pub const DEFAULT_PAGE_SIZE: usize = 256;

/// One page of a paginated enumeration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub documents: Vec<Document>,
    /// Offset of the next page, `None` on the last page
    pub next: Option<usize>,
}

/// Host-side document provider
pub trait DocumentSource: Sync {
    /// Fetch one document; `Ok(None)` when the source has no such id
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if the document exists but cannot be read.
    fn fetch_document(&self, id: &str) -> Result<Option<Document>, SourceError>;

    /// Fetch up to `limit` documents starting at `offset`, in id order
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if listing or reading fails.
    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Page, SourceError>;

    /// Enumerate every document page by page
    fn fetch_all_documents(&self, page_size: usize) -> Pages<'_, Self>
    where
        Self: Sized,
    {
        Pages { source: self, page_size: page_size.max(1), next: Some(0) }
    }
}

/// Iterator over the pages of a [`DocumentSource`]
///
/// Stops after the last page or the first error.
pub struct Pages<'a, S: DocumentSource> {
    source: &'a S,
    page_size: usize,
    next: Option<usize>,
}

impl<S: DocumentSource> Iterator for Pages<'_, S> {
    type Item = Result<Vec<Document>, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.next.take()?;
        match self.source.fetch_page(offset, self.page_size) {
            Ok(page) => {
                self.next = page.next;
                Some(Ok(page.documents))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Documents held in memory, keyed by id
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: BTreeMap<DocumentId, Document>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document
    pub fn insert(&mut self, document: Document) {
        self.documents.insert(document.id.clone(), document);
    }

    pub fn remove(&mut self, id: &str) -> Option<Document> {
        self.documents.remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FromIterator<Document> for MemorySource {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let mut source = Self::new();
        for doc in iter {
            source.insert(doc);
        }
        source
    }
}

impl DocumentSource for MemorySource {
    fn fetch_document(&self, id: &str) -> Result<Option<Document>, SourceError> {
        Ok(self.documents.get(id).cloned())
    }

    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Page, SourceError> {
        let documents: Vec<Document> =
            self.documents.values().skip(offset).take(limit).cloned().collect();
        let end = offset + documents.len();
        let next = (documents.len() == limit && end < self.documents.len()).then_some(end);
        Ok(Page { documents, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(n: usize) -> MemorySource {
        (0..n).map(|i| Document::new(format!("d{i:02}.md"), format!("#t{i}"))).collect()
    }

    #[test]
    fn test_pages_cover_everything_once() {
        let source = source(7);
        let pages: Vec<Vec<Document>> =
            source.fetch_all_documents(3).collect::<Result<_, _>>().unwrap();

        assert_eq!(pages.iter().map(Vec::len).collect::<Vec<_>>(), vec![3, 3, 1]);
        let ids: Vec<String> = pages.into_iter().flatten().map(|d| d.id).collect();
        assert_eq!(ids.len(), 7);
        assert_eq!(ids.first().map(String::as_str), Some("d00.md"));
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_page() {
        let source = source(4);
        assert_eq!(source.fetch_all_documents(2).count(), 2);
    }

    #[test]
    fn test_empty_source_yields_one_empty_page() {
        let pages: Vec<_> = MemorySource::new().fetch_all_documents(10).collect();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        assert_eq!(source(2).fetch_all_documents(0).count(), 2);
    }

    #[test]
    fn test_fetch_document() {
        let mut source = source(1);
        assert!(source.fetch_document("d00.md").unwrap().is_some());
        assert!(source.fetch_document("nope.md").unwrap().is_none());
        source.remove("d00.md");
        assert!(source.is_empty());
    }
}
