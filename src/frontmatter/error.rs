//! Front-matter diagnostics
//!
//! Front-matter problems never abort extraction. Each malformed line is
//! recorded as a `FrontMatterDiagnostic` on the parse result and parsing
//! continues with the next line.

use thiserror::Error;

/// Problems found while parsing a front-matter line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontMatterError {
    /// Line has no `key: value` separator
    #[error("Expected 'key: value', found '{0}'")]
    MissingSeparator(String),

    /// Key before the separator is empty
    #[error("Empty key")]
    EmptyKey,

    /// A `- item` line with no key above it
    #[error("List item without a key: '{0}'")]
    OrphanListItem(String),

    /// A `- item` line under a key that already holds a scalar
    #[error("List item under scalar key '{0}'")]
    ListUnderScalar(String),

    /// Opening quote never closed
    #[error("Unterminated quoted string: {0}")]
    UnterminatedQuote(String),

    /// Opening `[` never closed
    #[error("Unterminated inline list: {0}")]
    UnterminatedList(String),
}

/// A parse problem and the document line it occurred on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatterDiagnostic {
    pub line: usize,
    pub error: FrontMatterError,
}

impl std::fmt::Display for FrontMatterDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}
