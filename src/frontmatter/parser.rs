//! Permissive line-oriented front-matter parser
//!
//! Used when the block is not valid YAML. Understands the subset notes
//! actually use: `key: value` scalars, quoted strings, booleans, numbers,
//! `[a, b]` inline lists and `- item` list entries under an empty key.
//! Every line it cannot make sense of becomes a diagnostic.

use std::collections::BTreeMap;

use super::FrontMatterValue;
use super::error::{FrontMatterDiagnostic, FrontMatterError};

/// Parse `body` line by line; `first_line` is the document line of `body[0]`
#[must_use]
pub fn parse_lenient(
    body: &[&str],
    first_line: usize,
) -> (BTreeMap<String, FrontMatterValue>, Vec<FrontMatterDiagnostic>) {
    let mut data: BTreeMap<String, FrontMatterValue> = BTreeMap::new();
    let mut diagnostics = Vec::new();
    let mut current_key: Option<String> = None;

    for (offset, raw) in body.iter().enumerate() {
        let line = first_line + offset;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(item) = list_item(trimmed) {
            let Some(key) = current_key.as_ref() else {
                diagnostics.push(FrontMatterDiagnostic {
                    line,
                    error: FrontMatterError::OrphanListItem(trimmed.to_string()),
                });
                continue;
            };
            let value = parse_scalar(item, line, &mut diagnostics);
            match data.get_mut(key) {
                Some(FrontMatterValue::List(items)) => items.push(value),
                Some(slot @ FrontMatterValue::Null) => *slot = FrontMatterValue::List(vec![value]),
                _ => diagnostics.push(FrontMatterDiagnostic {
                    line,
                    error: FrontMatterError::ListUnderScalar(key.clone()),
                }),
            }
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            diagnostics.push(FrontMatterDiagnostic {
                line,
                error: FrontMatterError::MissingSeparator(trimmed.to_string()),
            });
            current_key = None;
            continue;
        };

        let key = unquote(key.trim());
        if key.is_empty() {
            diagnostics.push(FrontMatterDiagnostic { line, error: FrontMatterError::EmptyKey });
            current_key = None;
            continue;
        }

        let value = parse_value(value.trim(), line, &mut diagnostics);
        data.insert(key.to_string(), value);
        current_key = Some(key.to_string());
    }

    (data, diagnostics)
}

fn list_item(trimmed: &str) -> Option<&str> {
    if trimmed == "-" {
        return Some("");
    }
    trimmed.strip_prefix("- ").map(str::trim)
}

fn parse_value(
    value: &str,
    line: usize,
    diagnostics: &mut Vec<FrontMatterDiagnostic>,
) -> FrontMatterValue {
    let Some(inner) = value.strip_prefix('[') else {
        return parse_scalar(value, line, diagnostics);
    };

    let inner = match inner.strip_suffix(']') {
        Some(inner) => inner,
        None => {
            diagnostics.push(FrontMatterDiagnostic {
                line,
                error: FrontMatterError::UnterminatedList(value.to_string()),
            });
            inner
        }
    };

    let items = split_items(inner)
        .into_iter()
        .filter(|item| !item.is_empty())
        .map(|item| parse_scalar(item, line, diagnostics))
        .collect();
    FrontMatterValue::List(items)
}

/// Split an inline list body on commas outside quotes
fn split_items(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, ',') => {
                items.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(inner[start..].trim());
    items
}

fn parse_scalar(
    value: &str,
    line: usize,
    diagnostics: &mut Vec<FrontMatterDiagnostic>,
) -> FrontMatterValue {
    if value.is_empty() || value == "~" || value.eq_ignore_ascii_case("null") {
        return FrontMatterValue::Null;
    }

    for quote in ['"', '\''] {
        if let Some(rest) = value.strip_prefix(quote) {
            return match rest.strip_suffix(quote) {
                Some(inner) => FrontMatterValue::String(inner.to_string()),
                None => {
                    diagnostics.push(FrontMatterDiagnostic {
                        line,
                        error: FrontMatterError::UnterminatedQuote(value.to_string()),
                    });
                    FrontMatterValue::String(rest.to_string())
                }
            };
        }
    }

    if value.eq_ignore_ascii_case("true") {
        return FrontMatterValue::Bool(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return FrontMatterValue::Bool(false);
    }
    if value.parse::<f64>().is_ok() {
        return FrontMatterValue::Number(value.to_string());
    }
    FrontMatterValue::String(value.to_string())
}

fn unquote(key: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = key.strip_prefix(quote).and_then(|k| k.strip_suffix(quote)) {
            return inner;
        }
    }
    key
}
