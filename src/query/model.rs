//! Query model
//!
//! A [`Query`] is a disjunction of clauses; each clause is a conjunction of
//! [`QueryPart`]s. Queries are validated when built and immutable after, so
//! evaluation never has to deal with malformed input.
//!
//! The JSON wire form is a list of clauses, each a list of part objects:
//!
//! ```json
//! [[{"tag": "alpha", "negated": false}],
//!  [{"minValue": "2024-01", "maxValue": "2024-12"}],
//!  [{"document": "current", "title": "Plan"}]]
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::QueryError;
use crate::tags;

/// Literal document reference resolving to the caller's open document
pub const CURRENT_DOCUMENT: &str = "current";

/// Target of a document part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentRef {
    /// The document open in the caller, if any
    Current,
    Id(String),
}

impl DocumentRef {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        match text {
            "" => None,
            CURRENT_DOCUMENT => Some(Self::Current),
            id => Some(Self::Id(id.to_string())),
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Self::Current => CURRENT_DOCUMENT,
            Self::Id(id) => id,
        }
    }
}

/// One condition of a clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPart {
    /// Lines a tag applies to, or with `negated` the tagged lines it does not
    Tag { tag: String, negated: bool },
    /// All tagged lines of the referenced document(s)
    Document {
        reference: Option<DocumentRef>,
        title: Option<String>,
        negated: bool,
    },
    /// Lines of every tag within `[min, max]`, compared lexicographically
    Range { min: Option<String>, max: Option<String> },
}

impl QueryPart {
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag { tag: tag.into(), negated: false }
    }

    #[must_use]
    pub fn document(id: impl Into<String>) -> Self {
        Self::Document { reference: Some(DocumentRef::Id(id.into())), title: None, negated: false }
    }

    #[must_use]
    pub const fn current_document() -> Self {
        Self::Document { reference: Some(DocumentRef::Current), title: None, negated: false }
    }

    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self::Document { reference: None, title: Some(title.into()), negated: false }
    }

    #[must_use]
    pub fn range(min: Option<&str>, max: Option<&str>) -> Self {
        Self::Range { min: min.map(str::to_string), max: max.map(str::to_string) }
    }

    /// Flip negation; ranges are returned unchanged and rejected on validation
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Tag { tag, negated } => Self::Tag { tag, negated: !negated },
            Self::Document { reference, title, negated } => {
                Self::Document { reference, title, negated: !negated }
            }
            range @ Self::Range { .. } => range,
        }
    }

    fn validate(&self, clause: usize) -> Result<(), QueryError> {
        match self {
            Self::Tag { tag, .. } => {
                if tags::normalize(tag).is_empty() {
                    return Err(QueryError::EmptyTag { clause });
                }
            }
            Self::Document { reference, title, .. } => {
                let has_ref = reference.as_ref().is_some_and(|r| !r.as_str().trim().is_empty());
                let has_title = title.as_ref().is_some_and(|t| !t.trim().is_empty());
                if !has_ref && !has_title {
                    return Err(QueryError::EmptyDocumentReference { clause });
                }
            }
            Self::Range { min, max } => {
                let bounded = |b: &Option<String>| b.as_ref().is_some_and(|b| !b.trim().is_empty());
                if !bounded(min) && !bounded(max) {
                    return Err(QueryError::UnboundedRange { clause });
                }
            }
        }
        Ok(())
    }
}

/// Validated DNF query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<RawPart>>", into = "Vec<Vec<RawPart>>")]
pub struct Query {
    clauses: Vec<Vec<QueryPart>>,
}

impl Query {
    /// Build a query from clauses of parts
    ///
    /// # Errors
    ///
    /// Returns `QueryError` if there are no clauses, a clause is empty, or a
    /// part is blank (empty tag, document part without id or title, range
    /// without bounds).
    pub fn new(clauses: Vec<Vec<QueryPart>>) -> Result<Self, QueryError> {
        if clauses.is_empty() {
            return Err(QueryError::Empty);
        }
        for (i, clause) in clauses.iter().enumerate() {
            if clause.is_empty() {
                return Err(QueryError::EmptyClause { clause: i });
            }
            for part in clause {
                part.validate(i)?;
            }
        }
        Ok(Self { clauses })
    }

    /// A single clause holding a single part
    ///
    /// # Errors
    ///
    /// Returns `QueryError` if the part is blank.
    pub fn single(part: QueryPart) -> Result<Self, QueryError> {
        Self::new(vec![vec![part]])
    }

    /// Parse the text syntax, e.g. `#project -#done | doc:current`
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Syntax` for malformed text and the validation
    /// errors of [`Query::new`].
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        super::parser::parse(text)
    }

    /// Decode and validate the JSON form
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Json` if the text is not a list of part lists,
    /// and the validation errors of [`Query::new`].
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        let raw: Vec<Vec<RawPart>> = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Encode as the JSON form
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Json` if encoding fails.
    pub fn to_json(&self) -> Result<String, QueryError> {
        Ok(serde_json::to_string(self)?)
    }

    #[must_use]
    pub fn clauses(&self) -> &[Vec<QueryPart>] {
        &self.clauses
    }
}

impl std::str::FromStr for Query {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for QueryPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag { tag, negated } => {
                let bang = if *negated { "-" } else { "" };
                write!(f, "{bang}#{}", tags::normalize(tag))
            }
            Self::Document { reference, title, negated } => {
                let bang = if *negated { "-" } else { "" };
                let mut fields = Vec::new();
                if let Some(reference) = reference {
                    fields.push(format!("doc:{}", quoted(reference.as_str())));
                }
                if let Some(title) = title {
                    fields.push(format!("title:{}", quoted(title)));
                }
                write!(f, "{bang}{}", fields.join(" "))
            }
            Self::Range { min, max } => write!(
                f,
                "range:{}..{}",
                quoted(min.as_deref().unwrap_or_default()),
                quoted(max.as_deref().unwrap_or_default())
            ),
        }
    }
}

fn quoted(text: &str) -> String {
    if text.chars().any(char::is_whitespace) {
        format!("\"{text}\"")
    } else {
        text.to_string()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| clause.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "))
            .collect();
        write!(f, "{}", clauses.join(" | "))
    }
}

/// Wire form of a part: every field optional, kind decided on conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,
}

impl RawPart {
    fn into_part(self, clause: usize) -> Result<QueryPart, QueryError> {
        let is_tag = self.tag.is_some();
        let is_doc = self.document.is_some() || self.title.is_some();
        let is_range = self.min_value.is_some() || self.max_value.is_some();

        let kinds: Vec<&'static str> = [(is_tag, "tag"), (is_doc, "document"), (is_range, "range")]
            .into_iter()
            .filter_map(|(present, name)| present.then_some(name))
            .collect();
        if let [first, second, ..] = kinds[..] {
            return Err(QueryError::AmbiguousPart { clause, first, second });
        }

        if let Some(tag) = self.tag {
            return Ok(QueryPart::Tag { tag, negated: self.negated });
        }
        if is_doc {
            return Ok(QueryPart::Document {
                reference: self.document.as_deref().and_then(DocumentRef::parse),
                title: self.title,
                negated: self.negated,
            });
        }
        if is_range {
            if self.negated {
                return Err(QueryError::NegatedRange { clause });
            }
            let bound = |b: Option<String>| b.filter(|b| !b.trim().is_empty());
            return Ok(QueryPart::Range { min: bound(self.min_value), max: bound(self.max_value) });
        }
        Err(QueryError::UnknownPart { clause })
    }
}

impl From<QueryPart> for RawPart {
    fn from(part: QueryPart) -> Self {
        match part {
            QueryPart::Tag { tag, negated } => Self { tag: Some(tag), negated, ..Self::default() },
            QueryPart::Document { reference, title, negated } => Self {
                document: reference.map(|r| r.as_str().to_string()),
                title,
                negated,
                ..Self::default()
            },
            QueryPart::Range { min, max } => {
                Self { min_value: min, max_value: max, ..Self::default() }
            }
        }
    }
}

impl TryFrom<Vec<Vec<RawPart>>> for Query {
    type Error = QueryError;

    fn try_from(raw: Vec<Vec<RawPart>>) -> Result<Self, Self::Error> {
        let clauses = raw
            .into_iter()
            .enumerate()
            .map(|(i, clause)| {
                clause.into_iter().map(|part| part.into_part(i)).collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(clauses)
    }
}

impl From<Query> for Vec<Vec<RawPart>> {
    fn from(query: Query) -> Self {
        query
            .clauses
            .into_iter()
            .map(|clause| clause.into_iter().map(RawPart::from).collect())
            .collect()
    }
}
