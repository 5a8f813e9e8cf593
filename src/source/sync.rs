//! Feeding a [`DocumentSource`] into a [`SharedIndex`]

use std::collections::HashSet;

use tracing::{debug, info};

use super::{DocumentSource, SourceError};
use crate::document::DocumentId;
use crate::index::SharedIndex;

/// Outcome of a [`sync_source`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub pages: usize,
    pub indexed: usize,
    /// Documents dropped because the source no longer has them
    pub removed: usize,
}

/// Bring `index` in line with everything `source` currently holds
///
/// Scans on rayon's global pool. See [`sync_source_with_threads`].
///
/// # Errors
///
/// Returns `SourceError` if fetching a page fails or the index lock is
/// poisoned.
pub fn sync_source<S: DocumentSource>(
    index: &SharedIndex,
    source: &S,
    page_size: usize,
) -> Result<SyncReport, SourceError> {
    sync_source_with_threads(index, source, page_size, 0)
}

/// Bring `index` in line with `source`, scanning on `threads` workers
///
/// Each page is scanned in parallel and applied under one write lock, so
/// readers see whole pages. Once every page is in, documents the source did
/// not return are removed. A failed page leaves earlier pages applied and
/// removes nothing.
///
/// # Errors
///
/// Returns `SourceError` if fetching a page fails, the scanning pool cannot
/// start, or the index lock is poisoned.
pub fn sync_source_with_threads<S: DocumentSource>(
    index: &SharedIndex,
    source: &S,
    page_size: usize,
    threads: usize,
) -> Result<SyncReport, SourceError> {
    let mut report = SyncReport::default();
    let mut seen: HashSet<DocumentId> = HashSet::new();

    for page in source.fetch_all_documents(page_size) {
        let documents = page?;
        seen.extend(documents.iter().map(|doc| doc.id.clone()));
        report.indexed += index.index_documents(documents, threads)?;
        report.pages += 1;
        debug!(page = report.pages, indexed = report.indexed, "synced page");
    }

    let mut guard = index.write()?;
    let stale: Vec<DocumentId> = guard
        .document_ids()
        .into_iter()
        .filter(|id| !seen.contains(*id))
        .map(str::to_string)
        .collect();
    for id in &stale {
        guard.remove_document(id);
    }
    report.removed = stale.len();

    info!(
        pages = report.pages,
        indexed = report.indexed,
        removed = report.removed,
        "source sync complete"
    );
    Ok(report)
}

/// Re-fetch one document; returns whether the source still has it
///
/// A document the source no longer has is removed from the index.
///
/// # Errors
///
/// Returns `SourceError` if the fetch fails or the index lock is poisoned.
pub fn refresh_document<S: DocumentSource + ?Sized>(
    index: &SharedIndex,
    source: &S,
    id: &str,
) -> Result<bool, SourceError> {
    match source.fetch_document(id)? {
        Some(document) => {
            index.index_document(document)?;
            Ok(true)
        }
        None => {
            index.remove_document(id)?;
            debug!(id, "document gone from source");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::source::{MemorySource, Page};

    fn memory(docs: &[(&str, &str)]) -> MemorySource {
        docs.iter().map(|(id, text)| Document::new(*id, *text)).collect()
    }

    #[test]
    fn test_sync_indexes_every_page() {
        let index = SharedIndex::default();
        let source = memory(&[("a.md", "#x"), ("b.md", "#y"), ("c.md", "#x")]);

        let report = sync_source(&index, &source, 2).unwrap();
        assert_eq!(report, SyncReport { pages: 2, indexed: 3, removed: 0 });
        assert_eq!(index.read().unwrap().tag_lines("x").len(), 2);
    }

    #[test]
    fn test_sync_removes_vanished_documents() {
        let index = SharedIndex::default();
        let mut source = memory(&[("a.md", "#x"), ("b.md", "#y")]);
        sync_source(&index, &source, 10).unwrap();

        source.remove("b.md");
        source.insert(Document::new("a.md", "#z"));
        let report = sync_source_with_threads(&index, &source, 10, 2).unwrap();

        assert_eq!(report.removed, 1);
        let snapshot = index.read().unwrap();
        assert_eq!(snapshot.document_ids(), vec!["a.md"]);
        assert_eq!(snapshot.all_tags().collect::<Vec<_>>(), vec!["z"]);
    }

    #[test]
    fn test_refresh_document() {
        let index = SharedIndex::default();
        let mut source = memory(&[("a.md", "#x")]);

        assert!(refresh_document(&index, &source, "a.md").unwrap());
        assert!(index.read().unwrap().contains("a.md"));

        source.remove("a.md");
        assert!(!refresh_document(&index, &source, "a.md").unwrap());
        assert!(index.read().unwrap().is_empty());
    }

    struct FailingSource;

    impl DocumentSource for FailingSource {
        fn fetch_document(&self, id: &str) -> Result<Option<Document>, SourceError> {
            Err(SourceError::InvalidId(id.to_string()))
        }

        fn fetch_page(&self, offset: usize, _limit: usize) -> Result<Page, SourceError> {
            if offset == 0 {
                Ok(Page { documents: vec![Document::new("a.md", "#x")], next: Some(1) })
            } else {
                Err(SourceError::InvalidId("page".to_string()))
            }
        }
    }

    #[test]
    fn test_failed_page_keeps_earlier_pages_and_removes_nothing() {
        let index = SharedIndex::default();
        index.index_document(Document::new("old.md", "#o")).unwrap();

        assert!(sync_source(&index, &FailingSource, 1).is_err());
        let snapshot = index.read().unwrap();
        assert!(snapshot.contains("a.md"));
        assert!(snapshot.contains("old.md"));
    }
}
