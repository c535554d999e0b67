//! Date normalization shared by news import, week grouping and the trade calendar.
//!
//! Every consumer goes through [`normalize_date`] / [`resolve_date`] so the
//! `DD/MM/YYYY` assumption lives in exactly one place.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Weekday};

/// Trading weekdays in display order.
pub const WEEK_DAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

// Month-name layouts accepted by the generic fallback ("July 1 2025" and friends).
const LOOSE_FORMATS: &[&str] = &[
    "%B %d %Y",
    "%B %d, %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%A %B %d %Y",
    "%A, %B %d, %Y",
    "%a %b %d %Y",
];

/// Convert a raw date string into `YYYY-MM-DD`.
///
/// Slash dates with a 4-digit last segment are read as `DD/MM/YYYY`, never
/// `MM/DD/YYYY`. Strings that already start with a 4-digit year segment are
/// returned untouched. Anything that cannot be parsed comes back unchanged.
pub fn normalize_date(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    if input.contains('/') {
        let parts: Vec<&str> = input.split('/').collect();
        if parts.len() == 3 {
            if parts[2].len() == 4 {
                return format!("{}-{:0>2}-{:0>2}", parts[2], parts[1], parts[0]);
            } else if parts[0].len() == 4 {
                return format!("{}-{:0>2}-{:0>2}", parts[0], parts[1], parts[2]);
            }
        }
    }

    if input.contains('-') && input.split('-').next().is_some_and(|p| p.len() == 4) {
        return input.to_string();
    }

    match parse_loose(input) {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => input.to_string(),
    }
}

/// Normalize and parse into a calendar date. `None` means "unparseable".
///
/// A trailing time part (`2025-03-05T09:30:00`, `2025-03-05 09:30`) is ignored.
pub fn resolve_date(input: &str) -> Option<NaiveDate> {
    let iso = normalize_date(input.trim());
    let date_part = iso
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or_default();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// `true` when `s` is exactly a canonical `YYYY-MM-DD` date.
pub fn is_iso_date(s: &str) -> bool {
    s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn parse_loose(input: &str) -> Option<NaiveDate> {
    let compact = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&compact) {
        return Some(dt.date_naive());
    }
    LOOSE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&compact, fmt).ok())
}

/// Monday key of the week `date` belongs to.
///
/// Computed as `date - (weekday - 1)` with Sunday = 0, so a Sunday rolls
/// forward to the *following* Monday.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let from_sunday = i64::from(date.weekday().num_days_from_sunday());
    date - Duration::days(from_sunday - 1)
}

/// First three characters of a day name ("Monday" -> "Mon").
pub fn day_abbr(day_name: &str) -> String {
    day_name.chars().take(3).collect()
}

/// Accepts either the full weekday name or its 3-letter abbreviation.
pub fn is_day_match(event_day: &str, target_day: &str) -> bool {
    event_day == target_day || event_day == day_abbr(target_day)
}

/// English weekday name for a date.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
