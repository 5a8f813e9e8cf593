//! Per-document line sets produced by searches and queries

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use serde::Serialize;

use crate::document::DocumentId;

/// Document id → matched line numbers
///
/// Closed under [`intersect`](Self::intersect) and [`union`](Self::union).
/// A document is never stored with an empty line set, so "present" always
/// means "has at least one matching line".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet(BTreeMap<DocumentId, BTreeSet<usize>>);

impl ResultSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `lines` for `id`, unioning with anything already there
    pub fn insert(&mut self, id: impl Into<DocumentId>, lines: BTreeSet<usize>) {
        if lines.is_empty() {
            return;
        }
        match self.0.entry(id.into()) {
            btree_map::Entry::Occupied(mut entry) => entry.get_mut().extend(lines),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(lines);
            }
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BTreeSet<usize>> {
        self.0.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn documents(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, DocumentId, BTreeSet<usize>> {
        self.0.iter()
    }

    /// Number of documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of matched lines across all documents
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    /// Documents present in both, with the lines they share
    ///
    /// ```
    /// # use std::collections::BTreeSet;
    /// # use tagscope::ResultSet;
    /// let a: ResultSet = [("d".to_string(), BTreeSet::from([1, 2]))].into_iter().collect();
    /// let b: ResultSet = [("d".to_string(), BTreeSet::from([2, 3]))].into_iter().collect();
    /// assert_eq!(a.intersect(&b).get("d"), Some(&BTreeSet::from([2])));
    /// ```
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let mut out = Self::new();
        for (id, lines) in &self.0 {
            if let Some(theirs) = other.0.get(id) {
                out.insert(id.clone(), lines.intersection(theirs).copied().collect());
            }
        }
        out
    }

    /// Documents present in either, lines unioned where both have them
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.union_with(other);
        out
    }

    /// In-place [`union`](Self::union)
    pub fn union_with(&mut self, other: &Self) {
        for (id, lines) in &other.0 {
            self.insert(id.clone(), lines.clone());
        }
    }
}

impl FromIterator<(DocumentId, BTreeSet<usize>)> for ResultSet {
    fn from_iter<I: IntoIterator<Item = (DocumentId, BTreeSet<usize>)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (id, lines) in iter {
            out.insert(id, lines);
        }
        out
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = (&'a DocumentId, &'a BTreeSet<usize>);
    type IntoIter = btree_map::Iter<'a, DocumentId, BTreeSet<usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = (DocumentId, BTreeSet<usize>);
    type IntoIter = btree_map::IntoIter<DocumentId, BTreeSet<usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(entries: &[(&str, &[usize])]) -> ResultSet {
        entries
            .iter()
            .map(|(id, lines)| ((*id).to_string(), lines.iter().copied().collect()))
            .collect()
    }

    #[test]
    fn test_empty_lines_never_stored() {
        let mut rs = ResultSet::new();
        rs.insert("a", BTreeSet::new());
        assert!(rs.is_empty());
        assert!(!rs.contains("a"));
    }

    #[test]
    fn test_intersect_is_per_line() {
        let a = set(&[("x", &[1, 2, 3]), ("y", &[4])]);
        let b = set(&[("x", &[3, 9]), ("y", &[5]), ("z", &[1])]);
        assert_eq!(a.intersect(&b), set(&[("x", &[3])]));
    }

    #[test]
    fn test_union_merges_lines() {
        let a = set(&[("x", &[1]), ("y", &[4])]);
        let b = set(&[("x", &[2]), ("z", &[7])]);
        assert_eq!(a.union(&b), set(&[("x", &[1, 2]), ("y", &[4]), ("z", &[7])]));
    }

    #[test]
    fn test_identities() {
        let a = set(&[("x", &[1, 2])]);
        let empty = ResultSet::new();
        assert_eq!(a.union(&empty), a);
        assert!(a.intersect(&empty).is_empty());
        assert_eq!(a.intersect(&a), a);
    }

    #[test]
    fn test_counts() {
        let a = set(&[("x", &[1, 2]), ("y", &[4])]);
        assert_eq!(a.len(), 2);
        assert_eq!(a.line_count(), 3);
        assert_eq!(a.documents().collect::<Vec<_>>(), vec!["x", "y"]);
    }
}
