// Utility helpers for parsing and formatting.
//
// This module centralizes the "dirty" cell handling of spreadsheet exports so
// the rest of the code can assume clean, typed values.
use chrono::NaiveDateTime;
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Timestamp layout of the `Created` column, e.g. `02/Jun/25 10:15 AM`.
pub const CREATED_FORMAT: &str = "%d/%b/%y %I:%M %p";

/// Tokens spreadsheet readers treat as an absent value.
static NA_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "nan", "NaN", "NAN", "NA", "N/A", "n/a", "null", "NULL", "#N/A", "None", "<NA>",
    ]
    .into_iter()
    .collect()
});

/// `true` for cells that carry no value: empty, whitespace or an NA token.
pub fn is_missing(s: Option<&str>) -> bool {
    match s.map(str::trim) {
        None => true,
        Some(v) => v.is_empty() || NA_TOKENS.contains(v),
    }
}

/// Trimmed cell text, or an empty string for a missing cell.
pub fn clean_text(s: Option<&str>) -> String {
    if is_missing(s) {
        return String::new();
    }
    s.map(|v| v.trim().to_string()).unwrap_or_default()
}

pub fn parse_created(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(s, CREATED_FORMAT).ok()
}

/// Split a comma-separated list, dropping blank entries.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus thousands separators on the integer part.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = parts.next() {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
