use thiserror::Error;

/// Kind of pattern for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Tag,
    Exclude,
}

/// Errors produced while compiling patterns or resolving date tags
///
/// None of these are fatal to indexing: the scanner falls back to the
/// built-in patterns and leaves unresolved date tags as written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    /// Empty pattern is invalid
    #[error("Empty {kind:?} pattern provided")]
    InvalidEmpty { kind: PatternKind },
    /// Regex failed to compile
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },
    /// Offset after a date marker is not a signed integer
    #[error("Invalid date offset in '{text}'")]
    InvalidDateOffset { text: String },
    /// Format string contains an unknown specifier
    #[error("Invalid date format '{format}'")]
    InvalidDateFormat { format: String },
    /// Offset moves the date outside the representable calendar
    #[error("Date offset out of range in '{text}'")]
    DateOutOfRange { text: String },
}

impl PatternError {
    #[must_use]
    pub fn regex_compile(pattern: &str, reason: &str) -> Self {
        Self::InvalidRegex {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_compile_display() {
        let err = PatternError::regex_compile("#[", "unclosed class");
        assert_eq!(err.to_string(), "Invalid regex pattern '#[': unclosed class");
    }

    #[test]
    fn test_empty_display_names_kind() {
        let err = PatternError::InvalidEmpty { kind: PatternKind::Exclude };
        assert!(err.to_string().contains("Exclude"));
    }
}
