//! Tag normalization and hierarchical expansion
//!
//! Tags are stored lowercase without their leading `#`. A tag may be
//! hierarchical (`project/alpha`) and may carry a value after the configured
//! delimiter (`status=done`). With nesting enabled, every tag is expanded into
//! its prefix chain so that a search for a parent also finds its children:
//!
//! ```
//! # use tagscope::tags::prefix_chain;
//! assert_eq!(prefix_chain("a/b=1", "=", true), vec!["a", "a/b", "a/b=1"]);
//! assert_eq!(prefix_chain("a/b/c", "=", true), vec!["a", "a/b", "a/b/c"]);
//! assert_eq!(prefix_chain("a/b=1", "=", false), vec!["a/b=1"]);
//! ```

/// Separator between hierarchy levels
pub const HIERARCHY_DELIMITER: char = '/';

/// Normalize raw tag text: trim, drop a leading `#`, lowercase
///
/// ```
/// # use tagscope::tags::normalize;
/// assert_eq!(normalize(" #Project/Alpha "), "project/alpha");
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix('#').unwrap_or(trimmed).to_lowercase()
}

/// Split a tag into its key and optional value at the first delimiter
///
/// An empty delimiter means tags never carry values.
#[must_use]
pub fn split_value<'a>(tag: &'a str, delimiter: &str) -> (&'a str, Option<&'a str>) {
    if delimiter.is_empty() {
        return (tag, None);
    }
    match tag.split_once(delimiter) {
        Some((key, value)) => (key, Some(value)),
        None => (tag, None),
    }
}

/// The key part of a tag (`status` for `status=done`)
#[must_use]
pub fn key_of<'a>(tag: &'a str, delimiter: &str) -> &'a str {
    split_value(tag, delimiter).0
}

/// Expand a normalized tag into the chain of tags it implies
///
/// With nesting, the chain holds every non-empty prefix of the key's path
/// segments, followed by the full tag (key and value). Without
/// nesting the chain is the tag itself. The chain never holds duplicates.
#[must_use]
pub fn prefix_chain(tag: &str, delimiter: &str, nesting: bool) -> Vec<String> {
    if !nesting {
        return vec![tag.to_string()];
    }

    let key = key_of(tag, delimiter);
    let mut chain: Vec<String> = Vec::new();
    let mut prefix = String::with_capacity(key.len());

    for segment in key.split(HIERARCHY_DELIMITER) {
        if !prefix.is_empty() {
            prefix.push(HIERARCHY_DELIMITER);
        }
        prefix.push_str(segment);
        if segment.is_empty() {
            continue;
        }
        push_unique(&mut chain, &prefix);
    }

    push_unique(&mut chain, tag);
    chain
}

fn push_unique(chain: &mut Vec<String>, tag: &str) {
    if !chain.iter().any(|t| t == tag) {
        chain.push(tag.to_string());
    }
}

/// Replace runs of whitespace with `replacement`
///
/// ```
/// # use tagscope::tags::replace_spaces;
/// assert_eq!(replace_spaces("in  progress", "-"), "in-progress");
/// ```
#[must_use]
pub fn replace_spaces(text: &str, replacement: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(replacement)
}
