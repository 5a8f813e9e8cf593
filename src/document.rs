//! Documents and their per-tag line sets

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Opaque document identifier supplied by the host
pub type DocumentId = String;

/// A document as handed over by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: Option<String>,
    pub text: String,
}

impl Document {
    #[must_use]
    pub fn new(id: impl Into<DocumentId>, text: impl Into<String>) -> Self {
        Self { id: id.into(), title: None, text: text.into() }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Explicit title, or the file stem of the id
    ///
    /// ```
    /// # use tagscope::Document;
    /// assert_eq!(Document::new("notes/Project Plan.md", "").display_title(), "Project Plan");
    /// assert_eq!(Document::new("x", "").with_title("Y").display_title(), "Y");
    /// ```
    #[must_use]
    pub fn display_title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        Path::new(&self.id)
            .file_stem()
            .map_or_else(|| self.id.clone(), |stem| stem.to_string_lossy().into_owned())
    }
}

/// Lines a tag applies to within one document
///
/// `lines` holds every line the tag applies to, literally or through
/// inheritance. `count` is the number of lines carrying a literal match, so
/// `count <= lines.len()` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagOccurrences {
    pub lines: BTreeSet<usize>,
    pub count: usize,
}

impl TagOccurrences {
    /// Merge another occurrence set for the same tag into this one
    pub fn merge(&mut self, other: &Self) {
        self.lines.extend(other.lines.iter().copied());
        self.count = (self.count + other.count).min(self.lines.len());
    }
}

/// Tag → occurrences for one document, ordered by tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentTags(BTreeMap<String, TagOccurrences>);

impl DocumentTags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&TagOccurrences> {
        self.0.get(tag)
    }

    /// Occurrence entry for `tag`, created empty if missing
    pub fn entry(&mut self, tag: &str) -> &mut TagOccurrences {
        self.0.entry(tag.to_string()).or_default()
    }

    pub(crate) fn get_mut(&mut self, tag: &str) -> Option<&mut TagOccurrences> {
        self.0.get_mut(tag)
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, TagOccurrences> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tags whose line set contains `line`
    #[must_use]
    pub fn tags_at_line(&self, line: usize) -> BTreeSet<String> {
        self.0
            .iter()
            .filter(|(_, occ)| occ.lines.contains(&line))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    /// Every line that carries at least one tag
    #[must_use]
    pub fn tagged_lines(&self) -> BTreeSet<usize> {
        self.0.values().flat_map(|occ| occ.lines.iter().copied()).collect()
    }

    /// Merge another document's tags into this one
    pub fn merge(&mut self, other: &Self) {
        for (tag, occ) in &other.0 {
            self.entry(tag).merge(occ);
        }
    }
}

impl<'a> IntoIterator for &'a DocumentTags {
    type Item = (&'a String, &'a TagOccurrences);
    type IntoIter = btree_map::Iter<'a, String, TagOccurrences>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(lines: &[usize], count: usize) -> TagOccurrences {
        TagOccurrences { lines: lines.iter().copied().collect(), count }
    }

    #[test]
    fn test_merge_unions_lines_and_caps_count() {
        let mut a = occ(&[1, 2], 1);
        a.merge(&occ(&[2], 1));
        assert_eq!(a.lines.len(), 2);
        assert_eq!(a.count, 2);

        let mut b = occ(&[4], 1);
        b.merge(&occ(&[4], 1));
        assert_eq!(b.count, 1);
    }

    #[test]
    fn test_tags_at_line_and_universe() {
        let mut tags = DocumentTags::new();
        *tags.entry("alpha") = occ(&[1, 2], 1);
        *tags.entry("beta") = occ(&[2, 5], 2);

        let at_two: Vec<_> = tags.tags_at_line(2).into_iter().collect();
        assert_eq!(at_two, vec!["alpha", "beta"]);
        assert!(tags.tags_at_line(3).is_empty());
        assert_eq!(tags.tagged_lines().into_iter().collect::<Vec<_>>(), vec![1, 2, 5]);
    }

    #[test]
    fn test_display_title_without_extension() {
        assert_eq!(Document::new("daily", "").display_title(), "daily");
    }
}
