//! Value normalization for raw cells.
//!
//! Everything here is pure: raw text in, canonical value or
//! [`NormalizationError`] out. Callers attach the field name when turning an
//! error into a row issue.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use thiserror::Error;

use crate::slots::format_clock;

/// Formats that must reproduce the input exactly when the parsed date is
/// formatted back. Order matters: the first round-trip match wins, which
/// keeps `01-02-2025` a US date rather than an EU one.
const STRICT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%-m/%-d/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%B %-d, %Y",
    "%b %-d, %Y",
];

/// Best-effort formats tried after the strict pass, without the round-trip
/// check.
const LENIENT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m-%d-%Y",
    "%m-%d-%y",
    "%d-%m-%Y",
    "%m.%d.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%b. %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
    "%A %B %d, %Y",
    "%a, %b %d, %Y",
    "%a %b %d, %Y",
];

static CLOCK_LOOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2})(?::([0-5]\d))?\s*([ap])\.?\s*m\.?$").expect("static pattern")
});

static CLOCK_24H: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").expect("static pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("value is empty")]
    Empty,
    #[error("not a recognized date")]
    BadDate,
    #[error("must contain only digits")]
    NotDigits,
    #[error("number is too large")]
    Overflow,
}

/// `%Y` accepts one to four digits, so `1/6/25` parses as year 25. Only a
/// four-digit year is taken from a `%Y` format; two-digit years go to `%y`.
fn parse_with(value: &str, fmt: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(value, fmt).ok()?;
    if fmt.contains("%Y") && date.year() < 1000 {
        return None;
    }
    Some(date)
}

/// Parse a date in any supported spelling.
pub fn normalize_date(raw: &str) -> Result<NaiveDate, NormalizationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(NormalizationError::Empty);
    }

    for fmt in STRICT_DATE_FORMATS {
        if let Some(date) = parse_with(value, fmt)
            && date.format(fmt).to_string() == value
        {
            return Ok(date);
        }
    }

    for fmt in LENIENT_DATE_FORMATS {
        if let Some(date) = parse_with(value, fmt) {
            log::debug!("Parsed date '{value}' with lenient format '{fmt}'");
            return Ok(date);
        }
    }

    Err(NormalizationError::BadDate)
}

/// Parse a count (score, ranking). Only decimal digits are accepted.
///
/// An empty value is `Ok(None)` when `nullable`, else an error.
pub fn normalize_count(raw: &str, nullable: bool) -> Result<Option<u32>, NormalizationError> {
    let value = raw.trim();
    if value.is_empty() {
        return if nullable {
            Ok(None)
        } else {
            Err(NormalizationError::Empty)
        };
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NormalizationError::NotDigits);
    }
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| NormalizationError::Overflow)
}

/// Trim free text. `null` placeholders become empty.
pub fn normalize_text(raw: &str) -> String {
    let value = raw.trim();
    match value {
        "null" | "NULL" => String::new(),
        _ => value.to_string(),
    }
}

/// Canonicalize a time-slot modifier.
///
/// Clock times become `H:MM AM|PM`, bare `am`/`pm` become uppercase, and any
/// other label is kept as typed (trimmed).
pub fn normalize_modifier(raw: &str) -> String {
    let value = normalize_text(raw);
    if value.eq_ignore_ascii_case("am") || value.eq_ignore_ascii_case("pm") {
        return value.to_ascii_uppercase();
    }
    if let Some(caps) = CLOCK_LOOSE.captures(&value) {
        let hour: u32 = caps[1].parse().unwrap_or(0);
        let minute: u32 = caps.get(2).map_or(Ok(0), |m| m.as_str().parse()).unwrap_or(0);
        if (1..=12).contains(&hour) {
            let pm = caps[3].eq_ignore_ascii_case("p");
            let hour24 = match (hour, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, false) => h,
                (h, true) => h + 12,
            };
            return format_clock(hour24 * 60 + minute);
        }
    }
    if let Some(caps) = CLOCK_24H.captures(&value) {
        let hour: u32 = caps[1].parse().unwrap_or(0);
        let minute: u32 = caps[2].parse().unwrap_or(0);
        return format_clock(hour * 60 + minute);
    }
    value
}

/// Read an availability cell: `available` / `not available`, any case.
/// Anything else carries no value.
pub fn parse_availability_cell(raw: &str) -> Option<bool> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("available") {
        Some(true)
    } else if value.eq_ignore_ascii_case("not available") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_and_us_dates() {
        assert_eq!(normalize_date("2025-01-06"), Ok(ymd(2025, 1, 6)));
        assert_eq!(normalize_date("01/06/2025"), Ok(ymd(2025, 1, 6)));
        assert_eq!(normalize_date("1/6/2025"), Ok(ymd(2025, 1, 6)));
        assert_eq!(normalize_date(" 01-06-2025 "), Ok(ymd(2025, 1, 6)));
    }

    #[test]
    fn test_eu_dash_date_when_us_is_impossible() {
        assert_eq!(normalize_date("25-12-2024"), Ok(ymd(2024, 12, 25)));
    }

    #[test]
    fn test_month_name_dates() {
        assert_eq!(normalize_date("January 6, 2025"), Ok(ymd(2025, 1, 6)));
        assert_eq!(normalize_date("Jan 6, 2025"), Ok(ymd(2025, 1, 6)));
        assert_eq!(normalize_date("Monday January 06, 2025"), Ok(ymd(2025, 1, 6)));
    }

    #[test]
    fn test_lenient_fallback() {
        assert_eq!(normalize_date("2025/01/06"), Ok(ymd(2025, 1, 6)));
        assert_eq!(normalize_date("01/6/2025"), Ok(ymd(2025, 1, 6)));
    }

    #[test]
    fn test_two_digit_years() {
        assert_eq!(normalize_date("1/6/25"), Ok(ymd(2025, 1, 6)));
        assert_eq!(normalize_date("01/06/25"), Ok(ymd(2025, 1, 6)));
        assert_eq!(normalize_date("01-06-25"), Ok(ymd(2025, 1, 6)));
        assert_eq!(normalize_date("25-01-06"), Err(NormalizationError::BadDate));
        assert_eq!(normalize_date("Jan 6, 25"), Err(NormalizationError::BadDate));
    }

    #[test]
    fn test_bad_dates() {
        assert_eq!(normalize_date(""), Err(NormalizationError::Empty));
        assert_eq!(normalize_date("soon"), Err(NormalizationError::BadDate));
        assert_eq!(normalize_date("2025-02-30"), Err(NormalizationError::BadDate));
    }

    #[test]
    fn test_counts() {
        assert_eq!(normalize_count("12", false), Ok(Some(12)));
        assert_eq!(normalize_count(" 7 ", true), Ok(Some(7)));
        assert_eq!(normalize_count("", true), Ok(None));
        assert_eq!(normalize_count("", false), Err(NormalizationError::Empty));
        assert_eq!(normalize_count("-1", true), Err(NormalizationError::NotDigits));
        assert_eq!(normalize_count("3.5", true), Err(NormalizationError::NotDigits));
        assert_eq!(
            normalize_count("99999999999", true),
            Err(NormalizationError::Overflow)
        );
    }

    #[test]
    fn test_text() {
        assert_eq!(normalize_text("  Main court "), "Main court");
        assert_eq!(normalize_text("NULL"), "");
        assert_eq!(normalize_text("null"), "");
        assert_eq!(normalize_text("Null"), "Null");
    }

    #[test]
    fn test_modifiers() {
        assert_eq!(normalize_modifier("7:00 PM"), "7:00 PM");
        assert_eq!(normalize_modifier("07:00pm"), "7:00 PM");
        assert_eq!(normalize_modifier("7pm"), "7:00 PM");
        assert_eq!(normalize_modifier("12:30 a.m."), "12:30 AM");
        assert_eq!(normalize_modifier("19:15"), "7:15 PM");
        assert_eq!(normalize_modifier("am"), "AM");
        assert_eq!(normalize_modifier(" Late "), "Late");
    }

    #[test]
    fn test_availability_cells() {
        assert_eq!(parse_availability_cell("Available"), Some(true));
        assert_eq!(parse_availability_cell(" NOT AVAILABLE "), Some(false));
        assert_eq!(parse_availability_cell("maybe"), None);
        assert_eq!(parse_availability_cell(""), None);
    }
}
