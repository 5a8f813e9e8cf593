//! Boolean tag queries
//!
//! Queries arrive as text (`#a #b | #c`) or JSON, are validated into a
//! [`Query`], and evaluated against a [`TagIndex`](crate::index::TagIndex)
//! snapshot by a [`QueryEvaluator`].

pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;

pub use error::QueryError;
pub use evaluator::QueryEvaluator;
pub use model::{CURRENT_DOCUMENT, DocumentRef, Query, QueryPart, RawPart};
