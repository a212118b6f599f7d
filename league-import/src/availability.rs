//! Detection of team-availability date columns.
//!
//! Columns follow the convention
//! `Availability [<Weekday> <Month> <Day>, <Year> - <modifier>]`.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::normalize::{normalize_date, normalize_modifier};

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*availability\s*\[\s*([a-z]+)\s+([a-z]+\.?)\s+(\d{1,2}),\s*(\d{4})\s*-\s*([^\]]*?)\s*\]\s*$",
    )
    .expect("static pattern")
});

/// A header recognized as an availability column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityColumn {
    pub header: String,
    pub date: NaiveDate,
    /// Canonicalized modifier from the brackets.
    pub modifier: String,
}

/// Parse one header. `None` if it is not an availability column.
pub fn parse_availability_header(header: &str) -> Option<AvailabilityColumn> {
    let caps = HEADER.captures(header)?;
    let weekday = &caps[1];
    let text = format!("{} {}, {}", caps[2].trim_end_matches('.'), &caps[3], &caps[4]);
    let date = normalize_date(&text).ok()?;

    let actual = date.weekday().to_string();
    if !weekday
        .to_ascii_lowercase()
        .starts_with(&actual.to_ascii_lowercase())
    {
        log::debug!("Availability column '{header}' names {weekday}, but {date} is a {actual}");
    }

    let modifier = normalize_modifier(&caps[5]);
    if modifier.is_empty() {
        return None;
    }
    Some(AvailabilityColumn {
        header: header.trim().to_string(),
        date,
        modifier,
    })
}

/// All availability columns among `headers`, in column order.
pub fn detect_availability_columns(headers: &[String]) -> Vec<AvailabilityColumn> {
    headers
        .iter()
        .filter_map(|h| parse_availability_header(h))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_conventional_header() {
        let col =
            parse_availability_header("Availability [Monday January 6, 2025 - 7:00 PM]").unwrap();
        assert_eq!(col.date, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        assert_eq!(col.modifier, "7:00 PM");
    }

    #[test]
    fn test_prefix_is_case_insensitive_and_modifier_canonical() {
        let col = parse_availability_header("availability [Sat Feb 1, 2025 - am]").unwrap();
        assert_eq!(col.date, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(col.modifier, "AM");
    }

    #[test]
    fn test_rejects_other_headers() {
        assert!(parse_availability_header("Team").is_none());
        assert!(parse_availability_header("Availability").is_none());
        assert!(parse_availability_header("Availability [Someday - 7:00 PM]").is_none());
        assert!(parse_availability_header("Availability [Monday Smarch 6, 2025 - 7:00 PM]").is_none());
    }

    #[test]
    fn test_detect_keeps_column_order() {
        let headers = vec![
            "Team".to_string(),
            "Availability [Monday January 6, 2025 - 7:00 PM]".to_string(),
            "Division".to_string(),
            "Availability [Monday January 13, 2025 - 8:00 PM]".to_string(),
        ];
        let cols = detect_availability_columns(&headers);
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[1].modifier, "8:00 PM");
    }
}
