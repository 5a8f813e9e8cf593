//! Query evaluation against a [`TagIndex`]
//!
//! Each part becomes a [`ResultSet`]; parts of a clause are intersected per
//! line and clause results are unioned. Negation is resolved by the index
//! lookups, so the combination steps never see it.

use chrono::{Local, NaiveDate};
use tracing::{debug, trace};

use super::model::{DocumentRef, Query, QueryPart};
use crate::index::{ResultSet, SearchField, TagIndex};
use crate::tags;

/// Evaluates queries over one index snapshot
#[derive(Debug, Clone, Copy)]
pub struct QueryEvaluator<'a> {
    index: &'a TagIndex,
    today: NaiveDate,
}

impl<'a> QueryEvaluator<'a> {
    #[must_use]
    pub fn new(index: &'a TagIndex) -> Self {
        Self { index, today: Local::now().date_naive() }
    }

    /// Resolve relative date bounds against a fixed day
    #[must_use]
    pub const fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Matching lines per document
    ///
    /// `current` is the id of the caller's open document; `doc:current`
    /// parts match nothing when it is `None`.
    #[must_use]
    pub fn evaluate(&self, query: &Query, current: Option<&str>) -> ResultSet {
        let mut result = ResultSet::new();
        for clause in query.clauses() {
            result.union_with(&self.evaluate_clause(clause, current));
        }
        debug!(query = %query, documents = result.len(), lines = result.line_count(), "evaluated query");
        result
    }

    fn evaluate_clause(&self, clause: &[QueryPart], current: Option<&str>) -> ResultSet {
        let mut parts = clause.iter();
        let Some(first) = parts.next() else {
            return ResultSet::new();
        };

        let mut result = self.evaluate_part(first, current);
        for part in parts {
            if result.is_empty() {
                break;
            }
            result = result.intersect(&self.evaluate_part(part, current));
        }
        result
    }

    fn evaluate_part(&self, part: &QueryPart, current: Option<&str>) -> ResultSet {
        match part {
            QueryPart::Tag { tag, negated } => self.index.search_by(SearchField::Tag, tag, *negated),
            QueryPart::Document { reference, title, negated } => {
                self.evaluate_document(reference.as_ref(), title.as_deref(), *negated, current)
            }
            QueryPart::Range { min, max } => self.evaluate_range(min.as_deref(), max.as_deref()),
        }
    }

    fn evaluate_document(
        &self,
        reference: Option<&DocumentRef>,
        title: Option<&str>,
        negated: bool,
        current: Option<&str>,
    ) -> ResultSet {
        let id = match reference {
            Some(DocumentRef::Current) => current,
            Some(DocumentRef::Id(id)) => Some(id.as_str()),
            None => None,
        };

        let positive = match (id, title) {
            (Some(id), None) => return self.index.search_by(SearchField::DocumentId, id, negated),
            (None, Some(title)) => return self.index.search_by(SearchField::Title, title, negated),
            (Some(id), Some(title)) => self
                .index
                .search_by(SearchField::DocumentId, id, false)
                .union(&self.index.search_by(SearchField::Title, title, false)),
            (None, None) => ResultSet::new(),
        };

        if negated { self.index.complement(&positive) } else { positive }
    }

    /// Union of every tag in `[min, max]`
    ///
    /// Walks the index's ascending tag list, skipping tags below `min` and
    /// stopping at the first tag above `max`.
    fn evaluate_range(&self, min: Option<&str>, max: Option<&str>) -> ResultSet {
        let min = min.map(|b| self.resolve_bound(b));
        let max = max.map(|b| self.resolve_bound(b));
        trace!(?min, ?max, "range scan");

        let mut result = ResultSet::new();
        for tag in self
            .index
            .all_tags()
            .skip_while(|tag| min.as_deref().is_some_and(|min| *tag < min))
            .take_while(|tag| max.as_deref().is_none_or(|max| *tag <= max))
        {
            result.union_with(&self.index.tag_lines(tag));
        }
        result
    }

    fn resolve_bound(&self, bound: &str) -> String {
        let resolved = self.index.patterns().dates().resolve(&bound.to_lowercase(), self.today);
        tags::normalize(&resolved)
    }
}
