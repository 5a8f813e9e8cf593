//! Text query syntax
//!
//! ```text
//! #project -#done | doc:current title:"Weekly Review" | range:2024-01..2024-06
//! ```
//!
//! - clauses are separated by `|` or `OR`
//! - parts within a clause are separated by whitespace; `AND` is optional
//! - `-`, `!` or a preceding `NOT` negates a part
//! - `#tag` or `tag`, `doc:<id>` (`doc:current`), `title:<text>`,
//!   `range:<min>..<max>` with either bound optional
//! - double quotes group text containing spaces

use super::error::QueryError;
use super::model::{DocumentRef, Query, QueryPart};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word { text: String, position: usize },
    Pipe,
}

/// Parse text into a validated [`Query`]
///
/// # Errors
///
/// Returns `QueryError::Syntax` for an unterminated quote, a dangling
/// negation or a range without `..`, and the validation errors of
/// [`Query::new`] for empty clauses or blank parts.
pub fn parse(text: &str) -> Result<Query, QueryError> {
    let mut clauses: Vec<Vec<QueryPart>> = Vec::new();
    let mut clause: Vec<QueryPart> = Vec::new();
    let mut negate_next: Option<usize> = None;
    let mut saw_separator = false;

    for token in tokenize(text)? {
        match token {
            Token::Pipe => {
                if let Some(at) = negate_next.take() {
                    return Err(QueryError::syntax(at, "NOT must be followed by a part"));
                }
                clauses.push(std::mem::take(&mut clause));
                saw_separator = true;
            }
            Token::Word { text, position } => match text.as_str() {
                "OR" => {
                    if let Some(at) = negate_next.take() {
                        return Err(QueryError::syntax(at, "NOT must be followed by a part"));
                    }
                    clauses.push(std::mem::take(&mut clause));
                    saw_separator = true;
                }
                "AND" => {}
                "NOT" => {
                    negate_next = Some(position);
                }
                _ => {
                    let mut part = parse_part(&text, position)?;
                    if negate_next.take().is_some() {
                        if matches!(part, QueryPart::Range { .. }) {
                            return Err(QueryError::NegatedRange { clause: clauses.len() });
                        }
                        part = part.negate();
                    }
                    clause.push(part);
                }
            },
        }
    }

    if let Some(at) = negate_next {
        return Err(QueryError::syntax(at, "NOT must be followed by a part"));
    }
    if !clause.is_empty() || saw_separator {
        clauses.push(clause);
    }
    Query::new(clauses)
}

fn parse_part(word: &str, position: usize) -> Result<QueryPart, QueryError> {
    let (negated, body) = match word.strip_prefix(['-', '!']) {
        Some(rest) if !rest.is_empty() => (true, rest),
        Some(_) => return Err(QueryError::syntax(position, "negation must be followed by a part")),
        None => (false, word),
    };

    let part = if let Some(id) = body.strip_prefix("doc:") {
        QueryPart::Document {
            reference: Some(match id {
                super::model::CURRENT_DOCUMENT => DocumentRef::Current,
                id => DocumentRef::Id(id.to_string()),
            }),
            title: None,
            negated: false,
        }
    } else if let Some(title) = body.strip_prefix("title:") {
        QueryPart::title(title)
    } else if let Some(range) = body.strip_prefix("range:") {
        let Some((min, max)) = range.split_once("..") else {
            return Err(QueryError::syntax(position, "range must be written as <min>..<max>"));
        };
        if negated {
            return Err(QueryError::syntax(position, "a range cannot be negated"));
        }
        QueryPart::range(bound(min), bound(max))
    } else {
        QueryPart::tag(body.strip_prefix('#').unwrap_or(body))
    };

    Ok(if negated { part.negate() } else { part })
}

fn bound(text: &str) -> Option<&str> {
    (!text.is_empty()).then_some(text)
}

/// Split into words and pipes; quotes group text and are removed
fn tokenize(text: &str) -> Result<Vec<Token>, QueryError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start: Option<usize> = None;
    let mut quote_at: Option<usize> = None;

    for (i, c) in text.chars().enumerate() {
        match c {
            '"' => {
                quote_at = if quote_at.is_some() { None } else { Some(i) };
                start.get_or_insert(i);
            }
            c if quote_at.is_some() => current.push(c),
            '|' => {
                flush(&mut tokens, &mut current, &mut start);
                tokens.push(Token::Pipe);
            }
            c if c.is_whitespace() => flush(&mut tokens, &mut current, &mut start),
            c => {
                current.push(c);
                start.get_or_insert(i);
            }
        }
    }

    if let Some(at) = quote_at {
        return Err(QueryError::syntax(at, "unterminated quote"));
    }
    flush(&mut tokens, &mut current, &mut start);
    Ok(tokens)
}

fn flush(tokens: &mut Vec<Token>, current: &mut String, start: &mut Option<usize>) {
    if let Some(position) = start.take() {
        tokens.push(Token::Word { text: std::mem::take(current), position });
    }
}
