//! Relative date tags
//!
//! A marker such as `#today`, optionally followed by a signed integer, is
//! rewritten into a formatted calendar date before any other tag processing:
//! `#today-1` becomes `#2024-03-09` when today is 2024-03-10. Three variants
//! exist, each with its own marker and strftime format:
//!
//! - **today**: offset in days (`#today+3`)
//! - **week**: offset in weeks (`#thisweek-1`)
//! - **month**: offset in calendar months (`#thismonth+2`)

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::PatternError;

/// Calendar unit an offset is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateUnit {
    Day,
    Week,
    Month,
}

/// Marker and output format for one date-tag variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRule {
    pub marker: String,
    pub format: String,
}

impl DateRule {
    fn new(marker: &str, format: &str) -> Self {
        Self { marker: marker.to_string(), format: format.to_string() }
    }
}

/// User-facing date-tag settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateTagSettings {
    pub today: DateRule,
    pub week: DateRule,
    pub month: DateRule,
}

impl Default for DateTagSettings {
    fn default() -> Self {
        Self {
            today: DateRule::new("#today", "#%Y-%m-%d"),
            week: DateRule::new("#thisweek", "#%G-W%V"),
            month: DateRule::new("#thismonth", "#%Y-%m"),
        }
    }
}

/// Rewrites relative date markers into concrete dates
#[derive(Debug, Clone)]
pub struct DateResolver {
    // longest marker first so a marker that prefixes another never shadows it
    rules: Vec<(DateUnit, DateRule)>,
}

impl DateResolver {
    #[must_use]
    pub fn new(settings: &DateTagSettings) -> Self {
        let mut rules: Vec<(DateUnit, DateRule)> = [
            (DateUnit::Day, &settings.today),
            (DateUnit::Week, &settings.week),
            (DateUnit::Month, &settings.month),
        ]
        .into_iter()
        .filter(|(_, rule)| !rule.marker.is_empty())
        .map(|(unit, rule)| (unit, DateRule::new(&rule.marker.to_lowercase(), &rule.format)))
        .collect();
        rules.sort_by(|a, b| b.1.marker.len().cmp(&a.1.marker.len()));
        Self { rules }
    }

    /// Resolve the first date marker in `text`, logging and returning the
    /// original text when resolution fails.
    #[must_use]
    pub fn resolve(&self, text: &str, today: NaiveDate) -> String {
        match self.try_resolve(text, today) {
            Ok(Some(resolved)) => resolved,
            Ok(None) => text.to_string(),
            Err(e) => {
                warn!(text, error = %e, "leaving date tag unresolved");
                text.to_string()
            }
        }
    }

    /// Resolve the first date marker in `text`.
    ///
    /// Returns `Ok(None)` when `text` holds no marker. A marker directly
    /// followed by a letter or digit that is not part of an offset
    /// (`#todayish`) is not a marker.
    ///
    /// # Errors
    /// Returns `PatternError` when the offset is malformed, the format string
    /// is invalid, or the offset leaves the supported calendar range.
    pub fn try_resolve(&self, text: &str, today: NaiveDate) -> Result<Option<String>, PatternError> {
        for (unit, rule) in &self.rules {
            let mut search_from = 0;
            while let Some(pos) = text[search_from..].find(&rule.marker) {
                let start = search_from + pos;
                let after = start + rule.marker.len();
                search_from = after;

                let Some((offset, end)) = parse_offset(text, after)? else {
                    continue;
                };

                let date = shift(today, *unit, offset)
                    .ok_or_else(|| PatternError::DateOutOfRange { text: text.to_string() })?;
                let formatted = format_date(date, &rule.format)?;

                let mut resolved = String::with_capacity(text.len() + formatted.len());
                resolved.push_str(&text[..start]);
                resolved.push_str(&formatted);
                resolved.push_str(&text[end..]);
                return Ok(Some(resolved));
            }
        }
        Ok(None)
    }
}

/// Parse the optional signed offset that starts at byte `at`.
///
/// Returns the offset and the byte index where the marker token ends, or
/// `None` when the marker is glued to other word characters.
fn parse_offset(text: &str, at: usize) -> Result<Option<(i64, usize)>, PatternError> {
    let rest = &text[at..];
    let (sign, digits_from) = match rest.chars().next() {
        Some('+') => (1, 1),
        Some('-') => (-1, 1),
        _ => (1, 0),
    };
    let digits_len = rest[digits_from..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len() - digits_from);
    let token_end = digits_from + digits_len;

    if rest[token_end..].chars().next().is_some_and(char::is_alphanumeric) {
        return if digits_from == 0 && digits_len == 0 {
            Ok(None)
        } else {
            Err(PatternError::InvalidDateOffset { text: text.to_string() })
        };
    }

    if digits_len == 0 {
        if digits_from == 1 {
            return Err(PatternError::InvalidDateOffset { text: text.to_string() });
        }
        return Ok(Some((0, at)));
    }

    let magnitude: i64 = rest[digits_from..token_end]
        .parse()
        .map_err(|_| PatternError::InvalidDateOffset { text: text.to_string() })?;
    Ok(Some((sign * magnitude, at + token_end)))
}

fn shift(date: NaiveDate, unit: DateUnit, offset: i64) -> Option<NaiveDate> {
    let magnitude = offset.unsigned_abs();
    match unit {
        DateUnit::Day => shift_days(date, offset.is_negative(), magnitude),
        DateUnit::Week => shift_days(date, offset.is_negative(), magnitude.checked_mul(7)?),
        DateUnit::Month => {
            let months = Months::new(u32::try_from(magnitude).ok()?);
            if offset.is_negative() {
                date.checked_sub_months(months)
            } else {
                date.checked_add_months(months)
            }
        }
    }
}

fn shift_days(date: NaiveDate, backwards: bool, days: u64) -> Option<NaiveDate> {
    if backwards {
        date.checked_sub_days(Days::new(days))
    } else {
        date.checked_add_days(Days::new(days))
    }
}

fn format_date(date: NaiveDate, format: &str) -> Result<String, PatternError> {
    let invalid = || PatternError::InvalidDateFormat { format: format.to_string() };
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }
    let mut out = String::new();
    write!(out, "{}", date.format_with_items(items.iter())).map_err(|_| invalid())?;
    Ok(out)
}
