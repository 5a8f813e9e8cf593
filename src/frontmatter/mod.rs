//! Front-matter tag extraction
//!
//! A document may start with a metadata block:
//!
//! ```text
//! ---
//! tags: [project, "in progress"]
//! status: draft
//! ---
//! ```
//!
//! Its keys become synthetic tags: items of `tags` are taken as tags
//! directly, every other key becomes `key=value` (one tag per value), and the
//! `frontmatter` tag marks that the document has such a block. All of them
//! apply to every line the block spans.
//!
//! The block is parsed as YAML first; when that fails a permissive
//! line-oriented parser takes over and collects diagnostics instead of
//! failing.

pub mod error;
pub mod parser;

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::document::DocumentTags;
use crate::patterns::PatternConfig;
use crate::tags;

pub use error::{FrontMatterDiagnostic, FrontMatterError};

/// Tag added to every document that has a front-matter block
pub const FRONT_MATTER_TAG: &str = "frontmatter";

/// Key whose items are taken as tags directly
pub const TAGS_KEY: &str = "tags";

/// Maximum number of lines searched for the closing delimiter
pub const MAX_FRONT_MATTER_LINES: usize = 200;

const DELIMITER: &str = "---";

/// A parsed front-matter value
#[derive(Debug, Clone, PartialEq)]
pub enum FrontMatterValue {
    Null,
    Bool(bool),
    /// Numbers keep their written form
    Number(String),
    String(String),
    List(Vec<FrontMatterValue>),
    Map(BTreeMap<String, FrontMatterValue>),
}

impl FrontMatterValue {
    /// Text of a scalar value, `None` for null, lists and maps
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(n.clone()),
            Self::String(s) => Some(s.clone()),
            Self::Null | Self::List(_) | Self::Map(_) => None,
        }
    }
}

impl From<serde_yaml::Value> for FrontMatterValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n.to_string()),
            Value::String(s) => Self::String(s),
            Value::Sequence(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Mapping(map) => Self::Map(
                map.into_iter()
                    .filter_map(|(k, v)| Self::from(k).as_text().map(|k| (k, Self::from(v))))
                    .collect(),
            ),
            Value::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

/// A front-matter block and what could be read from it
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub data: BTreeMap<String, FrontMatterValue>,
    /// First line of the block (the opening delimiter)
    pub start_line: usize,
    /// Last line of the block (the closing delimiter when present)
    pub end_line: usize,
    pub diagnostics: Vec<FrontMatterDiagnostic>,
}

impl FrontMatter {
    /// Every line the block spans
    pub fn lines(&self) -> impl Iterator<Item = usize> {
        self.start_line..=self.end_line
    }
}

/// Locate and parse the front-matter block at the start of `text`
///
/// Returns `None` when the document does not start with `---`, or when
/// neither a closing `---` nor a blank line follows within
/// [`MAX_FRONT_MATTER_LINES`].
#[must_use]
pub fn parse_front_matter(text: &str) -> Option<FrontMatter> {
    let lines: Vec<&str> = text.lines().take(MAX_FRONT_MATTER_LINES + 1).collect();
    if lines.first().map(|l| l.trim_end()) != Some(DELIMITER) {
        return None;
    }

    let (body_end, end_line) = match lines[1..].iter().position(|l| l.trim_end() == DELIMITER) {
        Some(pos) => (pos + 1, pos + 1),
        None => {
            let blank = lines[1..].iter().position(|l| l.trim().is_empty())?;
            (blank + 1, blank)
        }
    };

    let body = &lines[1..body_end];
    let (data, diagnostics) = parse_body(body);
    Some(FrontMatter { data, start_line: 0, end_line, diagnostics })
}

fn parse_body(body: &[&str]) -> (BTreeMap<String, FrontMatterValue>, Vec<FrontMatterDiagnostic>) {
    match serde_yaml::from_str::<serde_yaml::Value>(&body.join("\n")) {
        Ok(serde_yaml::Value::Null) => (BTreeMap::new(), Vec::new()),
        Ok(value) => match FrontMatterValue::from(value) {
            FrontMatterValue::Map(data) => (data, Vec::new()),
            _ => parser::parse_lenient(body, 1),
        },
        Err(e) => {
            debug!(error = %e, "front matter is not valid YAML, using lenient parser");
            parser::parse_lenient(body, 1)
        }
    }
}

/// Synthetic tags for a parsed block, normalized and expanded
#[must_use]
pub fn front_matter_tags(front_matter: &FrontMatter, patterns: &PatternConfig) -> BTreeSet<String> {
    let mut raw: Vec<String> = vec![FRONT_MATTER_TAG.to_string()];
    for (key, value) in &front_matter.data {
        collect_key(&mut raw, key, value, patterns);
    }

    raw.iter()
        .filter(|tag| !tag.is_empty())
        .flat_map(|tag| tags::prefix_chain(tag, patterns.value_delimiter(), patterns.nesting()))
        .collect()
}

fn collect_key(out: &mut Vec<String>, key: &str, value: &FrontMatterValue, patterns: &PatternConfig) {
    let spaces = patterns.space_replacement();
    let key = tags::replace_spaces(&key.to_lowercase(), spaces);

    if key == TAGS_KEY {
        for item in tag_items(value) {
            out.push(tags::normalize(&tags::replace_spaces(&item, spaces)));
        }
        return;
    }

    match value {
        FrontMatterValue::Map(children) => {
            for (child, value) in children {
                let path = format!("{key}{}{child}", tags::HIERARCHY_DELIMITER);
                collect_key(out, &path, value, patterns);
            }
        }
        FrontMatterValue::List(items) => {
            for item in items {
                out.push(valued_tag(&key, item.as_text(), patterns));
            }
        }
        scalar => out.push(valued_tag(&key, scalar.as_text(), patterns)),
    }
}

fn valued_tag(key: &str, value: Option<String>, patterns: &PatternConfig) -> String {
    let value = value
        .map(|v| tags::replace_spaces(&v.to_lowercase(), patterns.space_replacement()))
        .filter(|v| !v.is_empty());
    match value {
        Some(value) => format!("{key}{}{value}", patterns.value_delimiter()),
        None => key.to_string(),
    }
}

/// Items of the `tags` key: list entries, or a comma/space separated string
fn tag_items(value: &FrontMatterValue) -> Vec<String> {
    match value {
        FrontMatterValue::List(items) => items.iter().filter_map(FrontMatterValue::as_text).collect(),
        FrontMatterValue::String(s) => s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        other => other.as_text().into_iter().collect(),
    }
}

/// Front-matter tags of `text`, each applying to the whole block
///
/// Empty when front-matter tags are disabled or the document has no block.
#[must_use]
pub fn extract(text: &str, patterns: &PatternConfig) -> DocumentTags {
    let mut out = DocumentTags::new();
    if patterns.ignore_front_matter() {
        return out;
    }
    let Some(front_matter) = parse_front_matter(text) else {
        return out;
    };

    for diagnostic in &front_matter.diagnostics {
        debug!(%diagnostic, "front matter problem");
    }

    for tag in front_matter_tags(&front_matter, patterns) {
        let occ = out.entry(&tag);
        occ.lines.extend(front_matter.lines());
        occ.count = 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternSettings;

    fn tags_of(text: &str) -> Vec<String> {
        extract(text, &PatternConfig::default()).tags().map(str::to_string).collect()
    }

    #[test]
    fn test_no_block() {
        assert!(parse_front_matter("# Title\n---\nk: v\n---").is_none());
        assert!(parse_front_matter("").is_none());
        assert!(tags_of("plain text").is_empty());
    }

    #[test]
    fn test_closed_block_span() {
        let fm = parse_front_matter("---\nstatus: draft\n---\nbody").unwrap();
        assert_eq!((fm.start_line, fm.end_line), (0, 2));
        assert_eq!(fm.data["status"], FrontMatterValue::String("draft".to_string()));
        assert!(fm.diagnostics.is_empty());
    }

    #[test]
    fn test_blank_line_fallback() {
        let fm = parse_front_matter("---\nstatus: draft\nowner: me\n\nbody").unwrap();
        assert_eq!(fm.end_line, 2);
        assert_eq!(fm.data.len(), 2);
    }

    #[test]
    fn test_closing_delimiter_preferred_over_blank_line() {
        let fm = parse_front_matter("---\na: 1\n\nb: 2\n---\n").unwrap();
        assert_eq!(fm.end_line, 4);
        assert_eq!(fm.data.len(), 2);
    }

    #[test]
    fn test_unterminated_block_without_blank_line() {
        assert!(parse_front_matter("---\na: 1\nb: 2").is_none());
    }

    #[test]
    fn test_lookahead_is_bounded() {
        let mut text = String::from("---\n");
        for i in 0..MAX_FRONT_MATTER_LINES + 5 {
            text.push_str(&format!("k{i}: v\n"));
        }
        text.push_str("---\n");
        assert!(parse_front_matter(&text).is_none());
    }

    #[test]
    fn test_synthetic_tags() {
        let text = "---\ntags: [Project, \"#in progress\"]\nstatus: Draft\nreviewed: true\nowners:\n  - ann\n  - bob\nempty:\n---\nbody";
        assert_eq!(
            tags_of(text),
            vec![
                "empty",
                "frontmatter",
                "in-progress",
                "owners",
                "owners=ann",
                "owners=bob",
                "project",
                "reviewed",
                "reviewed=true",
                "status",
                "status=draft",
            ]
        );
    }

    #[test]
    fn test_tags_as_string() {
        assert_eq!(
            tags_of("---\ntags: a, b/c\n---"),
            vec!["a", "b", "b/c", "frontmatter"]
        );
    }

    #[test]
    fn test_nested_map_flattened() {
        assert_eq!(
            tags_of("---\nproject:\n  phase: Two\n---"),
            vec!["frontmatter", "project", "project/phase", "project/phase=two"]
        );
    }

    #[test]
    fn test_all_tags_share_block_lines() {
        let tags = extract("---\nstatus: draft\n---\nbody", &PatternConfig::default());
        for (_, occ) in &tags {
            assert_eq!(occ.lines.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
            assert_eq!(occ.count, 1);
        }
    }

    #[test]
    fn test_invalid_yaml_uses_lenient_parser() {
        let fm = parse_front_matter("---\ntitle: [a, b\nstatus: ok\nbroken line\n---").unwrap();
        assert_eq!(fm.data["status"], FrontMatterValue::String("ok".to_string()));
        assert_eq!(fm.diagnostics.len(), 2);
        assert_eq!(fm.diagnostics[1].line, 3);
    }

    #[test]
    fn test_disabled_by_configuration() {
        let settings = PatternSettings { ignore_front_matter: true, ..Default::default() };
        let tags = extract("---\nstatus: draft\n---", &PatternConfig::new(&settings));
        assert!(tags.is_empty());
    }

    #[test]
    fn test_nesting_disabled_keeps_literal_tags() {
        let settings = PatternSettings { nesting: false, ..Default::default() };
        let tags = extract("---\nstatus: draft\n---", &PatternConfig::new(&settings));
        assert_eq!(tags.tags().collect::<Vec<_>>(), vec!["frontmatter", "status=draft"]);
    }

    #[test]
    fn test_empty_block() {
        let fm = parse_front_matter("---\n---\nbody").unwrap();
        assert!(fm.data.is_empty());
        assert_eq!(tags_of("---\n---\nbody"), vec!["frontmatter"]);
    }
}
