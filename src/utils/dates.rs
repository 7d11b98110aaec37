use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static RE_ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap());
static RE_LEADING_WEEKDAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").unwrap());
static RE_HOUR_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\s*([AP]M)$").unwrap());

// Day/month phrases, tried after the year has been appended
const DATE_FORMATS: &[&str] = &[
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d/%m %Y",
    "%d-%m %Y",
    "%d.%m %Y",
];

const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p", "%H.%M", "%Hh%M"];

/// Resolve a scraped date phrase and time phrase into `YYYY-MM-DD HH:MM`.
///
/// `"Today"` and `"Tomorrow"` are relative to `now`. Any other phrase is read as
/// a day and month in the current year, moving to next year when that date has
/// already passed. When either phrase cannot be understood the raw
/// `"{date_str} {time_str}"` is returned instead.
pub fn resolve_match_date(date_str: &str, time_str: &str, now: NaiveDateTime) -> String {
    match resolve(date_str, time_str, now) {
        Some(kickoff) => kickoff.format("%Y-%m-%d %H:%M").to_string(),
        None => {
            debug!("Could not parse date/time: {} {}", date_str, time_str);
            format!("{} {}", date_str, time_str)
        }
    }
}

fn resolve(date_str: &str, time_str: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let today = now.date();
    let date = match date_str.to_lowercase().as_str() {
        "today" => today,
        "tomorrow" => today + Duration::days(1),
        _ => {
            let this_year = parse_day_month(date_str, today.year())?;
            if this_year < today {
                parse_day_month(date_str, today.year() + 1)?
            } else {
                this_year
            }
        }
    };
    let time = parse_time_of_day(time_str)?;
    Some(date.and_time(time))
}

fn parse_day_month(phrase: &str, year: i32) -> Option<NaiveDate> {
    let cleaned = clean_phrase(phrase);
    if cleaned.is_empty() {
        return None;
    }
    let with_year = format!("{} {}", cleaned, year);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&with_year, fmt).ok())
        // a phrase carrying its own year parses as-is
        .or_else(|| NaiveDate::parse_from_str(&cleaned, "%d %b %Y").ok())
        .or_else(|| NaiveDate::parse_from_str(&cleaned, "%d/%m/%Y").ok())
}

fn parse_time_of_day(phrase: &str) -> Option<NaiveTime> {
    let upper = phrase.trim().to_uppercase();
    // "3pm" has no minutes field for chrono to read
    let cleaned = RE_HOUR_ONLY.replace(&upper, "$1:00 $2");
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&cleaned, fmt).ok())
}

fn clean_phrase(phrase: &str) -> String {
    let trimmed = phrase.trim().replace(',', " ");
    let no_weekday = RE_LEADING_WEEKDAY.replace(&trimmed, "");
    let no_ordinals = RE_ORDINAL_SUFFIX.replace_all(&no_weekday, "$1");
    no_ordinals.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_today_and_tomorrow() {
        let now = at(2024, 3, 1);
        assert_eq!(resolve_match_date("Today", "15:30", now), "2024-03-01 15:30");
        assert_eq!(resolve_match_date("TODAY", "09:05", now), "2024-03-01 09:05");
        assert_eq!(resolve_match_date("tomorrow", "20:00", now), "2024-03-02 20:00");
    }

    #[test]
    fn test_tomorrow_crosses_year_end() {
        let now = at(2024, 12, 31);
        assert_eq!(resolve_match_date("Tomorrow", "18:45", now), "2025-01-01 18:45");
    }

    #[test]
    fn test_past_day_month_moves_to_next_year() {
        let now = at(2024, 12, 15);
        assert_eq!(resolve_match_date("2 Jan", "10:00", now), "2025-01-02 10:00");
    }

    #[test]
    fn test_future_day_month_stays_in_current_year() {
        let now = at(2024, 3, 1);
        assert_eq!(resolve_match_date("12 March", "19:30", now), "2024-03-12 19:30");
        // same day is not in the past
        assert_eq!(resolve_match_date("1 Mar", "10:00", now), "2024-03-01 10:00");
    }

    #[test]
    fn test_lenient_phrases() {
        let now = at(2024, 3, 1);
        assert_eq!(resolve_match_date("Sat 9th Mar", "3:00 pm", now), "2024-03-09 15:00");
        assert_eq!(resolve_match_date("Mar 10", "7:45PM", now), "2024-03-10 19:45");
        assert_eq!(resolve_match_date("15/03", "21:00", now), "2024-03-15 21:00");
    }

    #[test]
    fn test_hour_only_twelve_hour_times() {
        let now = at(2024, 3, 1);
        assert_eq!(resolve_match_date("Today", "3pm", now), "2024-03-01 15:00");
        assert_eq!(resolve_match_date("Today", "3 PM", now), "2024-03-01 15:00");
        assert_eq!(resolve_match_date("Tomorrow", "11am", now), "2024-03-02 11:00");
        assert_eq!(resolve_match_date("Today", "13pm", now), "Today 13pm");
    }

    #[test]
    fn test_garbage_degrades_to_raw_text() {
        let now = at(2024, 3, 1);
        assert_eq!(resolve_match_date("garbled", "nonsense", now), "garbled nonsense");
        assert_eq!(resolve_match_date("Today", "soon", now), "Today soon");
        assert_eq!(resolve_match_date("", "10:00", now), " 10:00");
    }
}
