//! Display formatting for field values and pass dates.
//!
//! | Value | Hint | Output |
//! |---|---|---|
//! | number | `currencyCode` | `$1,234.50`, `€12.00`, `¥500`, `CHF 9.90` |
//! | number | `PKNumberStylePercent` | `45%` |
//! | number | none | `42`, `3.5` |
//! | string | `dateStyle` / `timeStyle` | `May 1, 2023, 7:00 PM` (raw string if unparseable) |
//! | string | none | unchanged |
//!
//! Formatting is fixed to US English conventions; field content is never
//! localized.

use crate::pass::{DateStyle, Field, FieldValue, NumberStyle};
use chrono::{DateTime, FixedOffset, NaiveDate};

/// Render a field's value as display text.
pub fn format_field_value(field: &Field) -> String {
    match &field.value {
        FieldValue::Number(n) => match (&field.currency_code, field.number_style) {
            (Some(code), _) => format_currency(*n, code),
            (None, Some(NumberStyle::Percent)) => format_percent(*n),
            _ => format_number(*n),
        },
        FieldValue::Text(text) if field.has_date_hint() => {
            let date_style = field.date_style.unwrap_or(DateStyle::None);
            let time_style = field.time_style.unwrap_or(DateStyle::None);
            format_date(text, date_style, time_style).unwrap_or_else(|| {
                log::debug!("field '{}': {text:?} is not a date, showing as-is", field.key);
                text.clone()
            })
        }
        FieldValue::Text(text) => text.clone(),
    }
}

/// Plain decimal: integral values without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

pub fn format_percent(value: f64) -> String {
    let scaled = (value * 100.0 * 1e6).round() / 1e6;
    format!("{}%", format_number(scaled))
}

/// Currency amount with symbol, grouping, and the currency's minor-unit digits.
pub fn format_currency(amount: f64, code: &str) -> String {
    let code = code.trim().to_ascii_uppercase();
    let (symbol, decimals) = match code.as_str() {
        "USD" => ("$", 2),
        "EUR" => ("€", 2),
        "GBP" => ("£", 2),
        "JPY" => ("¥", 0),
        "CAD" => ("CA$", 2),
        "AUD" => ("A$", 2),
        _ => ("", 2),
    };
    let sign = if amount < 0.0 { "-" } else { "" };
    let digits = group_thousands(amount.abs(), decimals);
    if symbol.is_empty() {
        format!("{sign}{code} {digits}")
    } else {
        format!("{sign}{symbol}{digits}")
    }
}

/// `1234567.891` with 2 decimals → `1,234,567.89`.
fn group_thousands(value: f64, decimals: usize) -> String {
    let fixed = format!("{value:.decimals$}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Parse the date forms found in pass manifests.
///
/// Accepts RFC 3339 (`2023-05-01T19:00:00-07:00`), the seconds-less variant
/// Wallet documents use (`2023-05-01T19:00-07:00`, `...T19:00Z`), and a bare
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_pass_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    let zoned = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(stem) => format!("{stem}+00:00"),
        None => raw.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_str(&zoned, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Format a date string with independent date and time styles.
///
/// Returns `None` when the string is not a date, or when both styles are
/// `None` (nothing would be shown).
pub fn format_date(raw: &str, date_style: DateStyle, time_style: DateStyle) -> Option<String> {
    let dt = parse_pass_date(raw)?;
    let date_part = match date_style {
        DateStyle::None => None,
        DateStyle::Short => Some(dt.format("%-m/%-d/%y").to_string()),
        DateStyle::Medium => Some(dt.format("%b %-d, %Y").to_string()),
        DateStyle::Long => Some(dt.format("%B %-d, %Y").to_string()),
        DateStyle::Full => Some(dt.format("%A, %B %-d, %Y").to_string()),
    };
    let time_part = match time_style {
        DateStyle::None => None,
        DateStyle::Short => Some(dt.format("%-I:%M %p").to_string()),
        DateStyle::Medium => Some(dt.format("%-I:%M:%S %p").to_string()),
        DateStyle::Long | DateStyle::Full => Some(dt.format("%-I:%M:%S %p %:z").to_string()),
    };
    match (date_part, time_part) {
        (Some(date), Some(time)) => {
            let joiner = match date_style {
                DateStyle::Long | DateStyle::Full => " at ",
                _ => ", ",
            };
            Some(format!("{date}{joiner}{time}"))
        }
        (Some(date), None) => Some(date),
        (None, Some(time)) => Some(time),
        (None, None) => None,
    }
}

/// Footer rendering of `relevantDate`: medium date, short time.
pub fn format_relevant_date(raw: &str) -> Option<String> {
    format_date(raw, DateStyle::Medium, DateStyle::Short)
}
