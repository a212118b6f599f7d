//! Fuzzy matching of date + modifier pairs to stored time slots.
//!
//! Slot modifiers are free text. Those shaped like `H:MM AM|PM` get a
//! minute-of-day value; the rest only match an identical label.

use std::sync::LazyLock;

use chrono::NaiveDate;
use league_core::TimeSlot;
use regex::Regex;

/// Latest start (11:30 AM) that still counts as a morning slot.
pub const AM_LAST_MINUTE: u32 = 11 * 60 + 30;
/// Earliest start (12:00 PM) that counts as an afternoon/evening slot.
pub const PM_FIRST_MINUTE: u32 = 12 * 60;
/// A clock modifier matches slots starting up to this many minutes later.
pub const MATCH_WINDOW_MINUTES: u32 = 30;

static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2}):([0-5]\d)\s*([AP]M)\s*$").expect("static pattern")
});

/// Minutes since midnight for a `H:MM AM|PM` string.
pub fn parse_clock_minutes(text: &str) -> Option<u32> {
    let caps = CLOCK.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let pm = caps[3].eq_ignore_ascii_case("pm");
    let hour24 = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };
    Some(hour24 * 60 + minute)
}

/// Render minutes since midnight as `H:MM AM|PM`.
pub fn format_clock(minutes: u32) -> String {
    let minutes = minutes % (24 * 60);
    let (hour24, minute) = (minutes / 60, minutes % 60);
    let suffix = if hour24 < 12 { "AM" } else { "PM" };
    let hour = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour}:{minute:02} {suffix}")
}

/// The slots on `date` that `modifier` refers to.
///
/// `AM` selects morning slots, `PM` afternoon and evening ones. A clock time
/// selects slots starting within [`MATCH_WINDOW_MINUTES`] after it. Any
/// modifier also matches a slot with the identical label.
pub fn match_slots<'a, I>(date: NaiveDate, modifier: &str, slots: I) -> Vec<&'a TimeSlot>
where
    I: IntoIterator<Item = &'a TimeSlot>,
{
    let modifier = modifier.trim();
    let target = if modifier.eq_ignore_ascii_case("am") {
        Target::Morning
    } else if modifier.eq_ignore_ascii_case("pm") {
        Target::Afternoon
    } else {
        match parse_clock_minutes(modifier) {
            Some(m) => Target::Around(m),
            None => Target::Label,
        }
    };

    slots
        .into_iter()
        .filter(|slot| slot.date == date)
        .filter(|slot| {
            if slot.modifier.trim().eq_ignore_ascii_case(modifier) {
                return true;
            }
            let Some(minutes) = parse_clock_minutes(&slot.modifier) else {
                return false;
            };
            match target {
                Target::Morning => minutes <= AM_LAST_MINUTE,
                Target::Afternoon => minutes >= PM_FIRST_MINUTE,
                Target::Around(t) => (t..=t + MATCH_WINDOW_MINUTES).contains(&minutes),
                Target::Label => false,
            }
        })
        .collect()
}

#[derive(Clone, Copy)]
enum Target {
    Morning,
    Afternoon,
    Around(u32),
    Label,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn slot(id: i64, modifier: &str) -> TimeSlot {
        TimeSlot {
            id,
            date: day(),
            modifier: modifier.to_string(),
        }
    }

    fn ids(found: Vec<&TimeSlot>) -> Vec<i64> {
        found.into_iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_parse_clock_minutes() {
        assert_eq!(parse_clock_minutes("12:00 AM"), Some(0));
        assert_eq!(parse_clock_minutes("11:30 AM"), Some(690));
        assert_eq!(parse_clock_minutes("12:00 PM"), Some(720));
        assert_eq!(parse_clock_minutes("7:00 pm"), Some(1140));
        assert_eq!(parse_clock_minutes("13:00 PM"), None);
        assert_eq!(parse_clock_minutes("Late"), None);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "12:00 AM");
        assert_eq!(format_clock(690), "11:30 AM");
        assert_eq!(format_clock(720), "12:00 PM");
        assert_eq!(format_clock(1170), "7:30 PM");
    }

    #[test]
    fn test_am_boundary() {
        let slots = [slot(1, "11:30 AM"), slot(2, "11:31 AM"), slot(3, "9:00 AM")];
        assert_eq!(ids(match_slots(day(), "AM", &slots)), vec![1, 3]);
    }

    #[test]
    fn test_pm_boundary() {
        let slots = [slot(1, "11:59 AM"), slot(2, "12:00 PM"), slot(3, "8:00 PM")];
        assert_eq!(ids(match_slots(day(), "pm", &slots)), vec![2, 3]);
    }

    #[test]
    fn test_clock_window() {
        let slots = [
            slot(1, "6:59 PM"),
            slot(2, "7:00 PM"),
            slot(3, "7:30 PM"),
            slot(4, "7:31 PM"),
        ];
        assert_eq!(ids(match_slots(day(), "7:00 PM", &slots)), vec![2, 3]);
    }

    #[test]
    fn test_other_dates_never_match() {
        let mut other = slot(9, "7:00 PM");
        other.date = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        assert!(match_slots(day(), "7:00 PM", &[other]).is_empty());
    }

    #[test]
    fn test_labels_match_only_identically() {
        let slots = [slot(1, "Early"), slot(2, "7:00 PM")];
        assert_eq!(ids(match_slots(day(), "early", &slots)), vec![1]);
        assert!(match_slots(day(), "Late", &slots).is_empty());
        assert!(match_slots(day(), "AM", &[slot(3, "Early")]).is_empty());
    }
}
