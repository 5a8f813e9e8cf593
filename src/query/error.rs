//! Query validation errors
//!
//! Every malformed query is rejected at the boundary, before evaluation, with
//! the clause it was found in so callers can point at the problem.

use thiserror::Error;

/// Reasons a query is rejected
#[derive(Debug, Error)]
pub enum QueryError {
    /// Query without any clause
    #[error("Query has no clauses")]
    Empty,

    /// Clause without any part
    #[error("Clause {clause} has no parts")]
    EmptyClause { clause: usize },

    /// Tag part whose tag is blank
    #[error("Clause {clause}: tag is empty")]
    EmptyTag { clause: usize },

    /// Document part with neither id nor title
    #[error("Clause {clause}: document reference needs an id or a title")]
    EmptyDocumentReference { clause: usize },

    /// Range part without any bound
    #[error("Clause {clause}: range needs a minimum or a maximum")]
    UnboundedRange { clause: usize },

    /// Ranges cannot be negated
    #[error("Clause {clause}: a range cannot be negated")]
    NegatedRange { clause: usize },

    /// Part mixing fields of different kinds (e.g. `tag` and `minValue`)
    #[error("Clause {clause}: part mixes {first} and {second}")]
    AmbiguousPart {
        clause: usize,
        first: &'static str,
        second: &'static str,
    },

    /// Part with no recognized field
    #[error("Clause {clause}: part has none of tag, document, title, minValue, maxValue")]
    UnknownPart { clause: usize },

    /// Text query could not be parsed
    #[error("Syntax error at {position}: {message}")]
    Syntax { position: usize, message: String },

    /// JSON query could not be decoded
    #[error("Invalid JSON query: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueryError {
    /// Create a syntax error at a character position
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax { position, message: message.into() }
    }
}
