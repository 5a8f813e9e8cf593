//! Turn matched line sets into text blocks
//!
//! Consecutive matched lines form one block, the unit renderers show as a
//! single match. Lines {2, 3, 7} become two blocks: lines 2-3 and line 7.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::warn;

use crate::document::DocumentId;
use crate::index::{ResultSet, TagIndex};

/// A maximal run of consecutive matched lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchBlock {
    /// First line of the run
    pub first_line: usize,
    /// The run's lines joined with `\n`
    pub text: String,
}

/// All blocks of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMatches {
    pub id: DocumentId,
    pub title: String,
    pub blocks: Vec<MatchBlock>,
}

/// Group `lines` of `text` into blocks of consecutive lines
///
/// Line numbers past the end of `text` are ignored.
#[must_use]
pub fn blocks(lines: &BTreeSet<usize>, text: &str) -> Vec<MatchBlock> {
    let source: Vec<&str> = text.lines().collect();
    let mut out: Vec<MatchBlock> = Vec::new();
    let mut previous: Option<usize> = None;

    for &line in lines {
        let Some(content) = source.get(line) else {
            break;
        };
        match out.last_mut() {
            Some(block) if previous == Some(line.wrapping_sub(1)) => {
                block.text.push('\n');
                block.text.push_str(content);
            }
            _ => out.push(MatchBlock { first_line: line, text: (*content).to_string() }),
        }
        previous = Some(line);
    }
    out
}

/// Blocks for every document in `results`, in document id order
///
/// Documents no longer in `index` are skipped.
#[must_use]
pub fn materialize(results: &ResultSet, index: &TagIndex) -> Vec<DocumentMatches> {
    results
        .iter()
        .filter_map(|(id, lines)| {
            let Some(doc) = index.document(id) else {
                warn!(id = %id, "matched document is no longer indexed");
                return None;
            };
            Some(DocumentMatches {
                id: id.clone(),
                title: doc.title.clone(),
                blocks: blocks(lines, &doc.text),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{index_of, lines};

    const TEXT: &str = "l0\nl1\nl2\nl3\nl4\nl5\nl6\nl7";

    #[test]
    fn test_two_runs() {
        assert_eq!(
            blocks(&lines(&[2, 3, 7]), TEXT),
            vec![
                MatchBlock { first_line: 2, text: "l2\nl3".to_string() },
                MatchBlock { first_line: 7, text: "l7".to_string() },
            ]
        );
    }

    #[test]
    fn test_first_line_zero() {
        let out = blocks(&lines(&[0, 1, 3]), TEXT);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], MatchBlock { first_line: 0, text: "l0\nl1".to_string() });
    }

    #[test]
    fn test_lines_past_end_ignored() {
        let out = blocks(&lines(&[7, 8, 20]), TEXT);
        assert_eq!(out, vec![MatchBlock { first_line: 7, text: "l7".to_string() }]);
        assert!(blocks(&lines(&[]), TEXT).is_empty());
    }

    #[test]
    fn test_materialize_result_set() {
        let index = index_of(&[("a.md", "#x one\n  two\nthree\n#x four"), ("b.md", "#y")]);
        let results = index.search_by(crate::index::SearchField::Tag, "x", false);
        let docs = materialize(&results, &index);

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "a.md");
        assert_eq!(docs[0].title, "a");
        assert_eq!(
            docs[0].blocks,
            vec![
                MatchBlock { first_line: 0, text: "#x one\n  two".to_string() },
                MatchBlock { first_line: 3, text: "#x four".to_string() },
            ]
        );
    }

    #[test]
    fn test_unknown_document_skipped() {
        let index = index_of(&[]);
        let results: ResultSet = [("gone.md".to_string(), lines(&[0]))].into_iter().collect();
        assert!(materialize(&results, &index).is_empty());
    }
}
