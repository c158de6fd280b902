//! Normalization helpers for comparing extracted values with pattern tables.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_DIGITS: Regex = Regex::new(r"\D+").unwrap();

    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    // Ordinal suffixes in long dates ("January 1st, 2024")
    static ref ORDINAL_SUFFIX: Regex = Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap();
}

/// Date layouts tried when reading a printed date. Both month-first and
/// day-first readings are kept; placeholder dates are symmetric enough that
/// either reading matching is a hit.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%m/%d/%y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Lowercase, trim, collapse whitespace, drop trailing punctuation.
pub fn normalize_text(value: &str) -> String {
    let collapsed = WHITESPACE.replace_all(value.trim(), " ");
    collapsed
        .trim_end_matches(['.', ',', ';', ':'])
        .to_lowercase()
}

/// Digits only.
pub fn digits(value: &str) -> String {
    NON_DIGITS.replace_all(value, "").into_owned()
}

/// Whether `value` equals any table entry after text normalization.
pub fn matches_any(value: &str, table: &[String]) -> bool {
    let value = normalize_text(value);
    !value.is_empty() && table.iter().any(|entry| normalize_text(entry) == value)
}

/// Whether the digits of `value` equal the digits of any table entry.
pub fn digits_match_any(value: &str, table: &[String]) -> bool {
    let value = digits(value);
    !value.is_empty() && table.iter().any(|entry| digits(entry) == value)
}

/// Whether `value` contains any of the fragments after normalization.
pub fn contains_any(value: &str, fragments: &[String]) -> bool {
    let value = normalize_text(value);
    !value.is_empty()
        && fragments
            .iter()
            .map(|f| normalize_text(f))
            .any(|f| !f.is_empty() && value.contains(&f))
}

/// Every calendar reading of a printed date.
pub fn parse_dates(value: &str) -> Vec<NaiveDate> {
    let cleaned = ORDINAL_SUFFIX.replace_all(value.trim(), "$1");
    let cleaned = WHITESPACE.replace_all(&cleaned, " ");

    let mut dates: Vec<NaiveDate> = DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
        .collect();
    dates.sort();
    dates.dedup();
    dates
}

/// Whether a printed date matches a placeholder, either as a calendar date or
/// by its text.
pub fn date_matches(value: &str, placeholders: &[NaiveDate], texts: &[String]) -> bool {
    if matches_any(value, texts) {
        return true;
    }
    parse_dates(value).iter().any(|d| placeholders.contains(d))
}
