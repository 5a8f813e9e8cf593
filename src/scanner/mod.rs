//! Tag scanner - turns one document's text into per-tag line sets
//!
//! The scanner makes a single forward pass over the lowercased lines of a
//! document. Besides literal matches it tracks two kinds of inherited scope:
//!
//! - **Indentation**: a tag applies to every following line indented deeper
//!   than the line it appeared on, until a line at the same or a shallower
//!   indentation closes the block.
//! - **Headings**: a tag written on a heading line stays open until a heading
//!   of the same or a more prominent level; while open, it is attached to
//!   every line that carries some tag.
//!
//! Blank lines, fenced code blocks (when ignored) and embedded query/results
//! blocks are skipped without touching any scope.
//!
//! # Examples
//!
//! ```
//! use tagscope::{PatternConfig, TagScanner};
//!
//! let patterns = PatternConfig::default();
//! let tags = TagScanner::new(&patterns).scan("- task #todo\n  detail\n- next");
//! let lines: Vec<_> = tags.get("todo").unwrap().lines.iter().copied().collect();
//! assert_eq!(lines, vec![0, 1]);
//! ```

pub mod scope;

use std::collections::{HashMap, HashSet};

use chrono::{Local, NaiveDate};
use tracing::trace;

use crate::document::DocumentTags;
use crate::patterns::{
    PatternConfig, QUERY_BLOCK_END, QUERY_BLOCK_START, RESULTS_BLOCK_END, RESULTS_BLOCK_START,
};
use crate::tags;

pub use scope::Scope;

/// Scans documents for tags under one pattern configuration
///
/// Holds no state between documents; every call to [`TagScanner::scan`] is
/// independent.
#[derive(Debug, Clone)]
pub struct TagScanner<'a> {
    patterns: &'a PatternConfig,
    today: NaiveDate,
}

impl<'a> TagScanner<'a> {
    #[must_use]
    pub fn new(patterns: &'a PatternConfig) -> Self {
        Self { patterns, today: Local::now().date_naive() }
    }

    /// Use a fixed date for relative date tags
    #[must_use]
    pub const fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Scan a document and return each tag's line set and literal count
    #[must_use]
    pub fn scan(&self, text: &str) -> DocumentTags {
        let mut state = ScanState::default();
        for (number, raw) in text.lines().enumerate() {
            self.scan_line(&mut state, number, &raw.to_lowercase());
        }
        trace!(tags = state.tags.len(), "scanned document");
        state.tags
    }

    fn scan_line(&self, state: &mut ScanState, number: usize, line: &str) {
        if state.skip(line, self.patterns.ignore_code_blocks()) {
            return;
        }

        let inherit = self.patterns.inheritance();
        let indent = indent_width(line);

        for (tag, scope) in &mut state.indent_scope {
            if scope.enter_line(indent)
                && inherit
                && let Some(occ) = state.tags.get_mut(tag)
            {
                occ.lines.insert(number);
            }
        }

        let heading = heading_level(line);
        if heading > 0 && inherit {
            for scope in state.heading_scope.values_mut() {
                scope.enter_heading(heading);
            }
        }

        let mut counted: HashSet<String> = HashSet::new();
        for found in self.patterns.find_tags(line) {
            let resolved = self.patterns.dates().resolve(found, self.today);
            let tag = tags::normalize(&resolved);
            if tag.is_empty() {
                continue;
            }

            let chain =
                tags::prefix_chain(&tag, self.patterns.value_delimiter(), self.patterns.nesting());
            for element in chain {
                state.indent_scope.entry(element.clone()).or_default().open_indent(indent);
                if inherit && heading > 0 {
                    state.heading_scope.entry(element.clone()).or_default().open_heading(heading);
                }

                let occ = state.tags.entry(&element);
                occ.lines.insert(number);
                if counted.insert(element) {
                    occ.count += 1;
                }
            }
        }

        if !counted.is_empty() {
            for (tag, scope) in &state.heading_scope {
                if scope.is_active()
                    && let Some(occ) = state.tags.get_mut(tag)
                {
                    occ.lines.insert(number);
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct ScanState {
    in_fence: bool,
    in_query: bool,
    in_results: bool,
    indent_scope: HashMap<String, Scope>,
    heading_scope: HashMap<String, Scope>,
    tags: DocumentTags,
}

impl ScanState {
    /// Update block toggles for `line`; true when the line must not be scanned
    fn skip(&mut self, line: &str, ignore_code_blocks: bool) -> bool {
        let trimmed = line.trim();

        if self.in_query {
            if trimmed == QUERY_BLOCK_END {
                self.in_query = false;
            }
            return true;
        }
        if self.in_results {
            if trimmed == RESULTS_BLOCK_END {
                self.in_results = false;
            }
            return true;
        }
        if ignore_code_blocks && is_fence(trimmed) {
            self.in_fence = !self.in_fence;
            return true;
        }
        if self.in_fence {
            return true;
        }

        match trimmed {
            QUERY_BLOCK_START => {
                self.in_query = true;
                true
            }
            RESULTS_BLOCK_START => {
                self.in_results = true;
                true
            }
            QUERY_BLOCK_END | RESULTS_BLOCK_END => true,
            "" => true,
            _ => false,
        }
    }
}

fn is_fence(trimmed: &str) -> bool {
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Number of leading whitespace characters
#[must_use]
pub fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Markdown heading level of `line`, 0 when it is not a heading
///
/// ```
/// # use tagscope::scanner::heading_level;
/// assert_eq!(heading_level("## Sub"), 2);
/// assert_eq!(heading_level("#"), 1);
/// assert_eq!(heading_level("#tag at start"), 0);
/// assert_eq!(heading_level("plain"), 0);
/// ```
#[must_use]
pub fn heading_level(line: &str) -> usize {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    match trimmed[level..].chars().next() {
        None => level,
        Some(c) if c.is_whitespace() => level,
        Some(_) => 0,
    }
}
