//! Output formatting for CLI display
//!
//! Line numbers are stored 0-based and shown 1-based.

use std::collections::BTreeSet;

use colored::Colorize;

use crate::document::TagOccurrences;
use crate::materialize::{DocumentMatches, MatchBlock};

/// Line number as shown to users
#[must_use]
pub const fn display_line(line: usize) -> usize {
    line + 1
}

/// Collapse a line set into display ranges, e.g. `1, 3-5`
#[must_use]
pub fn line_ranges(lines: &BTreeSet<usize>) -> String {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for &line in lines {
        match ranges.last_mut() {
            Some((_, end)) if *end + 1 == line => *end = line,
            _ => ranges.push((line, line)),
        }
    }

    ranges
        .into_iter()
        .map(|(start, end)| {
            if start == end {
                display_line(start).to_string()
            } else {
                format!("{}-{}", display_line(start), display_line(end))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Heading printed above a document's blocks
#[must_use]
pub fn document_header(matches: &DocumentMatches, quiet: bool) -> String {
    if quiet {
        matches.id.clone()
    } else {
        format!("{} ({})", matches.id.bold(), matches.title.cyan())
    }
}

/// One block, each line prefixed by its number unless `quiet`
#[must_use]
pub fn match_block(block: &MatchBlock, quiet: bool) -> String {
    if quiet {
        return block.text.clone();
    }

    block
        .text
        .lines()
        .enumerate()
        .map(|(offset, text)| {
            let number = format!("{:>5}", display_line(block.first_line + offset));
            format!("{} {text}", number.dimmed())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a tag with its literal occurrence count
#[must_use]
pub fn tag_with_count(tag: &str, count: usize, quiet: bool) -> String {
    if quiet {
        tag.to_string()
    } else {
        format!("  {} ({count})", format!("#{tag}").green())
    }
}

/// Format a tag with the lines it applies to
#[must_use]
pub fn tag_with_lines(tag: &str, occurrences: &TagOccurrences, quiet: bool) -> String {
    let lines = line_ranges(&occurrences.lines);
    if quiet {
        format!("{tag}\t{lines}")
    } else {
        format!("  {} {}", format!("#{tag}").green(), format!("[{lines}]").dimmed())
    }
}

/// Summary printed when a query matched nothing
#[must_use]
pub fn no_matches() -> String {
    "No matching lines".yellow().to_string()
}
