//! Inverted tag index
//!
//! Holds every indexed document's tag occurrences and the reverse mapping
//! tag → documents, kept consistent on every (re)index:
//! - `documents`: document id → title, text and per-tag line sets
//! - `tag_documents`: tag → ids of documents carrying it, ordered by tag
//!
//! Indexing a document always replaces its previous contribution, so calling
//! [`TagIndex::index_document`] again with unchanged text is a no-op.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::debug;

use crate::document::{Document, DocumentId, DocumentTags};
use crate::frontmatter;
use crate::patterns::PatternConfig;
use crate::scanner::TagScanner;
use crate::tags;

pub mod error;
pub mod result_set;
pub mod shared;

pub use error::IndexError;
pub use result_set::ResultSet;
pub use shared::SharedIndex;

/// Field a [`TagIndex::search_by`] lookup matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    /// Tag name, normalized before lookup
    Tag,
    /// Exact document id
    DocumentId,
    /// Document title, case-insensitive
    Title,
}

/// A scanned document ready to be inserted into the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDocument {
    pub id: DocumentId,
    pub title: String,
    pub text: String,
    pub tags: DocumentTags,
}

impl IndexedDocument {
    /// Lines carrying at least one tag
    #[must_use]
    pub fn tagged_lines(&self) -> BTreeSet<usize> {
        self.tags.tagged_lines()
    }
}

/// Turns documents into [`IndexedDocument`]s
///
/// Pure per-document work with no shared state, so it can run on any number
/// of threads while the index itself stays single-writer.
#[derive(Debug, Clone)]
pub struct Indexer {
    patterns: Arc<PatternConfig>,
    today: Option<NaiveDate>,
}

impl Indexer {
    #[must_use]
    pub const fn new(patterns: Arc<PatternConfig>) -> Self {
        Self { patterns, today: None }
    }

    /// Resolve date tags against a fixed day instead of the local date
    #[must_use]
    pub const fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    #[must_use]
    pub fn patterns(&self) -> &PatternConfig {
        &self.patterns
    }

    /// Body tags merged with front-matter tags
    #[must_use]
    pub fn scan(&self, document: Document) -> IndexedDocument {
        let mut scanner = TagScanner::new(&self.patterns);
        if let Some(today) = self.today {
            scanner = scanner.with_today(today);
        }

        let mut tags = scanner.scan(&document.text);
        tags.merge(&frontmatter::extract(&document.text, &self.patterns));
        debug_assert!(tags.iter().all(|(_, occ)| occ.count <= occ.lines.len()));

        IndexedDocument {
            title: document.display_title(),
            id: document.id,
            text: document.text,
            tags,
        }
    }

    /// Scan a batch on rayon's global pool
    #[must_use]
    pub fn scan_all(&self, documents: Vec<Document>) -> Vec<IndexedDocument> {
        documents.into_par_iter().map(|doc| self.scan(doc)).collect()
    }

    /// Scan a batch on a dedicated pool of `threads` workers
    ///
    /// `threads == 0` uses rayon's global pool.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::ThreadPool` if the pool cannot be started.
    pub fn scan_all_with_threads(
        &self,
        documents: Vec<Document>,
        threads: usize,
    ) -> Result<Vec<IndexedDocument>, IndexError> {
        if threads == 0 {
            return Ok(self.scan_all(documents));
        }
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        Ok(pool.install(|| self.scan_all(documents)))
    }
}

/// In-memory inverted index over tagged documents
#[derive(Debug, Clone)]
pub struct TagIndex {
    indexer: Indexer,
    documents: HashMap<DocumentId, IndexedDocument>,
    tag_documents: BTreeMap<String, BTreeSet<DocumentId>>,
}

impl Default for TagIndex {
    fn default() -> Self {
        Self::new(Arc::new(PatternConfig::default()))
    }
}

impl TagIndex {
    #[must_use]
    pub fn new(patterns: Arc<PatternConfig>) -> Self {
        Self::with_indexer(Indexer::new(patterns))
    }

    #[must_use]
    pub fn with_indexer(indexer: Indexer) -> Self {
        Self { indexer, documents: HashMap::new(), tag_documents: BTreeMap::new() }
    }

    /// The indexer used for every (re)index
    #[must_use]
    pub const fn indexer(&self) -> &Indexer {
        &self.indexer
    }

    #[must_use]
    pub fn patterns(&self) -> &PatternConfig {
        self.indexer.patterns()
    }

    /// Scan `document` and replace its previous contribution
    pub fn index_document(&mut self, document: Document) {
        let indexed = self.indexer.scan(document);
        self.insert(indexed);
    }

    /// Scan a batch in parallel, then insert sequentially
    pub fn index_documents(&mut self, documents: Vec<Document>) {
        for indexed in self.indexer.scan_all(documents) {
            self.insert(indexed);
        }
    }

    /// Insert an already scanned document, replacing any previous version
    pub fn insert(&mut self, document: IndexedDocument) {
        self.remove_document(&document.id);

        for tag in document.tags.tags() {
            self.tag_documents
                .entry(tag.to_string())
                .or_default()
                .insert(document.id.clone());
        }
        debug!(id = %document.id, tags = document.tags.len(), "indexed document");
        self.documents.insert(document.id.clone(), document);
    }

    /// Delete a document's whole contribution; returns whether it was indexed
    pub fn remove_document(&mut self, id: &str) -> bool {
        let Some(old) = self.documents.remove(id) else {
            return false;
        };

        for tag in old.tags.tags() {
            if let Some(ids) = self.tag_documents.get_mut(tag) {
                ids.remove(id);
                if ids.is_empty() {
                    self.tag_documents.remove(tag);
                }
            }
        }
        debug!(id, "removed document");
        true
    }

    /// Drop every document
    pub fn clear(&mut self) {
        self.documents.clear();
        self.tag_documents.clear();
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[must_use]
    pub fn document(&self, id: &str) -> Option<&IndexedDocument> {
        self.documents.get(id)
    }

    /// Ids of every indexed document, sorted
    #[must_use]
    pub fn document_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.documents.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Tags present in a document
    #[must_use]
    pub fn tags_of(&self, id: &str) -> Option<&DocumentTags> {
        self.documents.get(id).map(|doc| &doc.tags)
    }

    /// Tags applying to one line of a document
    ///
    /// # Errors
    ///
    /// Returns `IndexError::DocumentNotFound` if `id` is not indexed.
    pub fn tags_at_line(&self, id: &str, line: usize) -> Result<BTreeSet<String>, IndexError> {
        self.tags_of(id)
            .map(|tags| tags.tags_at_line(line))
            .ok_or_else(|| IndexError::DocumentNotFound(id.to_string()))
    }

    /// Every distinct tag in ascending order
    ///
    /// Range queries stop scanning at the first tag past their upper bound,
    /// which is only correct because of this ordering.
    pub fn all_tags(&self) -> impl Iterator<Item = &str> {
        self.tag_documents.keys().map(String::as_str)
    }

    /// Literal occurrence counts per tag across all documents
    ///
    /// Valued tags count towards their key. With nesting the key is already
    /// indexed as a chain element, so valued entries are skipped to avoid
    /// counting the same match twice.
    #[must_use]
    pub fn tag_counts(&self, delimiter: &str) -> BTreeMap<String, usize> {
        let nesting = self.patterns().nesting();
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();

        for doc in self.documents.values() {
            for (tag, occ) in &doc.tags {
                if occ.count == 0 {
                    continue;
                }
                let (key, value) = tags::split_value(tag, delimiter);
                if nesting && value.is_some() && !key.is_empty() {
                    continue;
                }
                *counts.entry(key.to_string()).or_insert(0) += occ.count;
            }
        }
        counts
    }

    /// [`tag_counts`](Self::tag_counts) without tags below `min_count`
    #[must_use]
    pub fn tag_counts_with_min(&self, delimiter: &str, min_count: usize) -> BTreeMap<String, usize> {
        let mut counts = self.tag_counts(delimiter);
        counts.retain(|_, count| *count >= min_count);
        counts
    }

    /// Lines of a stored tag in every document carrying it
    ///
    /// `tag` is looked up as stored, without normalization.
    #[must_use]
    pub fn tag_lines(&self, tag: &str) -> ResultSet {
        let Some(ids) = self.tag_documents.get(tag) else {
            return ResultSet::new();
        };
        ids.iter()
            .filter_map(|id| {
                let occ = self.documents.get(id)?.tags.get(tag)?;
                Some((id.clone(), occ.lines.clone()))
            })
            .collect()
    }

    /// Look up `value` in `field`
    ///
    /// A positive tag search maps each document carrying the tag to the
    /// lines it applies to. Document and title searches map the matching
    /// documents to all of their tagged lines.
    ///
    /// A negated search returns, for every document with at least one tag,
    /// the tagged lines not in the positive result. Documents without tags
    /// have nothing to negate against and never appear.
    #[must_use]
    pub fn search_by(&self, field: SearchField, value: &str, negated: bool) -> ResultSet {
        let positive = match field {
            SearchField::Tag => self.tag_lines(&tags::normalize(value)),
            SearchField::DocumentId => self.documents_where(|doc| doc.id == value),
            SearchField::Title => {
                let wanted = value.trim().to_lowercase();
                self.documents_where(|doc| doc.title.to_lowercase() == wanted)
            }
        };

        if negated { self.complement(&positive) } else { positive }
    }

    fn documents_where(&self, predicate: impl Fn(&IndexedDocument) -> bool) -> ResultSet {
        self.documents
            .values()
            .filter(|doc| predicate(doc))
            .map(|doc| (doc.id.clone(), doc.tagged_lines()))
            .collect()
    }

    /// Tagged lines of every document that are not in `positive`
    #[must_use]
    pub fn complement(&self, positive: &ResultSet) -> ResultSet {
        self.documents
            .values()
            .map(|doc| {
                let universe = doc.tagged_lines();
                let lines = match positive.get(&doc.id) {
                    Some(hit) => universe.difference(hit).copied().collect(),
                    None => universe,
                };
                (doc.id.clone(), lines)
            })
            .collect()
    }
}
