use regex::Regex;

use super::error::{PatternError, PatternKind};

/// Compiled regex used to find (or exclude) inline tags
///
/// When the expression has a capture group, group 1 is the tag text; otherwise
/// the whole match is. This lets a pattern anchor on surrounding context (such
/// as "start of line or whitespace") without that context leaking into the tag.
#[derive(Debug, Clone)]
pub struct TagPattern {
    original: String,
    compiled: Regex,
}

impl TagPattern {
    /// Compile a tag pattern.
    ///
    /// # Errors
    /// * Returns `PatternError::InvalidEmpty` if `p` is empty.
    /// * Returns `PatternError::InvalidRegex` if the pattern fails to compile.
    pub fn regex(p: &str, kind: PatternKind) -> Result<Self, PatternError> {
        if p.is_empty() {
            return Err(PatternError::InvalidEmpty { kind });
        }
        Regex::new(p)
            .map(|compiled| Self { original: p.to_string(), compiled })
            .map_err(|e| PatternError::regex_compile(p, &e.to_string()))
    }

    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Iterate over the tag texts found in `line`
    pub fn find_iter<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.compiled.captures_iter(line).filter_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(0))
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
        })
    }

    /// Whether `text` matches anywhere
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.compiled.is_match(text)
    }
}

impl PartialEq for TagPattern {
    fn eq(&self, other: &Self) -> bool {
        self.original == other.original
    }
}

impl Eq for TagPattern {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern_rejected() {
        let err = TagPattern::regex("", PatternKind::Tag).unwrap_err();
        assert_eq!(err, PatternError::InvalidEmpty { kind: PatternKind::Tag });
    }

    #[test]
    fn test_invalid_regex_rejected() {
        assert!(matches!(
            TagPattern::regex("#(", PatternKind::Tag),
            Err(PatternError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_capture_group_preferred() {
        let pattern = TagPattern::regex(r"(?:^|\s)(#\w+)", PatternKind::Tag).unwrap();
        let found: Vec<_> = pattern.find_iter("see #one and #two").collect();
        assert_eq!(found, vec!["#one", "#two"]);
    }

    #[test]
    fn test_whole_match_without_group() {
        let pattern = TagPattern::regex(r"#\w+", PatternKind::Tag).unwrap();
        let found: Vec<_> = pattern.find_iter("#a b#c").collect();
        assert_eq!(found, vec!["#a", "#c"]);
    }
}
