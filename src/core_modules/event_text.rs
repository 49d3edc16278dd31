//! Text heuristics for recognized calendar cells: day tokens, wall-clock times,
//! shift markers and title cleanup.

use chrono::NaiveTime;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static DAY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}\b").expect("valid day token regex"));
static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}$").expect("valid bare number regex"));
static CLOCK_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}):(\d{2})(?:\s*([ap]m))?\b").expect("valid clock time regex")
});

const MOON_GLYPHS: [char; 5] = ['☾', '☽', '🌙', '🌛', '🌜'];

/// A day-of-month number found in fragment text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayToken {
    pub day: u32,
    /// Byte range of the token within the source text.
    pub span: Range<usize>,
}

/// The first word-bounded 1-2 digit number between 1 and 31.
pub fn find_day(text: &str) -> Option<DayToken> {
    DAY_TOKEN.find_iter(text).find_map(|found| {
        let day: u32 = found.as_str().parse().ok()?;
        (1..=31).contains(&day).then(|| DayToken {
            day,
            span: found.range(),
        })
    })
}

pub fn has_day(text: &str) -> bool {
    find_day(text).is_some()
}

/// True when the whole (trimmed) text is a 1-2 digit number.
pub fn is_bare_number(text: &str) -> bool {
    BARE_NUMBER.is_match(text.trim())
}

/// The text with the day token cut out, trimmed.
pub fn strip_day(text: &str, token: &DayToken) -> String {
    let mut remainder = String::with_capacity(text.len());
    remainder.push_str(&text[..token.span.start]);
    remainder.push(' ');
    remainder.push_str(&text[token.span.end..]);
    remainder.trim().to_string()
}

/// Wall-clock times pulled out of a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTimes {
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    /// The title with every recognized time removed.
    pub remainder: String,
}

/// Finds `H:MM` times with an optional AM/PM suffix. The first becomes the start,
/// the second the end; all of them are removed from the returned remainder.
/// Matches that are not a real time of day (say `27:90`) are left in place.
pub fn extract_times(title: &str) -> ExtractedTimes {
    let mut times = Vec::new();
    let mut remainder = String::with_capacity(title.len());
    let mut cursor = 0;

    for captures in CLOCK_TIME.captures_iter(title) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let hour = captures.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
        let minute = captures.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
        let meridiem = captures.get(3).map(|m| m.as_str());

        let Some(time) = hour
            .zip(minute)
            .and_then(|(hour, minute)| to_24_hour(hour, meridiem).map(|hour| (hour, minute)))
            .and_then(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0))
        else {
            continue;
        };

        times.push(time);
        remainder.push_str(&title[cursor..whole.start()]);
        remainder.push(' ');
        cursor = whole.end();
    }
    remainder.push_str(&title[cursor..]);

    ExtractedTimes {
        start: times.first().copied(),
        end: times.get(1).copied(),
        remainder,
    }
}

/// Converts a 12-hour reading to 24-hour. Without a suffix the hour is taken as is.
fn to_24_hour(hour: u32, meridiem: Option<&str>) -> Option<u32> {
    let hour = match meridiem.map(str::to_ascii_lowercase).as_deref() {
        Some("pm") if hour == 12 => 12,
        Some("pm") => hour + 12,
        Some("am") if hour == 12 => 0,
        _ => hour,
    };
    (hour < 24).then_some(hour)
}

/// Keeps only `[A-Za-z0-9 \-:]`, collapses whitespace and trims.
pub fn clean_title(text: &str) -> String {
    let kept: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | ':'))
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Night shifts are marked with a "C" or a moon.
pub fn is_night_shift(text: &str) -> bool {
    text.chars()
        .any(|c| c.eq_ignore_ascii_case(&'c') || MOON_GLYPHS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(hour: u32, minute: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(hour, minute, 0)
    }

    #[test]
    fn finds_first_day_in_range() {
        assert_eq!(find_day("31 Task").map(|t| t.day), Some(31));
        assert_eq!(find_day("Task 7").map(|t| t.day), Some(7));
        assert_eq!(find_day("0 then 45 then 12").map(|t| t.day), Some(12));
        assert_eq!(find_day("(9)").map(|t| t.day), Some(9));
    }

    #[test]
    fn ignores_numbers_without_word_boundaries() {
        assert!(find_day("Meeting at 3pm").is_none());
        assert!(find_day("2024").is_none());
        assert!(find_day("Room B12").is_none());
        assert!(find_day("").is_none());
    }

    #[test]
    fn time_digits_still_count_as_day_candidates() {
        assert_eq!(find_day("Dentist 9:30").map(|t| t.day), Some(9));
    }

    #[test]
    fn strips_only_the_day_token() {
        let text = "12 Call 12 people";
        let token = find_day(text).unwrap();
        assert_eq!(token.span, 0..2);
        assert_eq!(strip_day(text, &token), "Call 12 people");

        let text = "Gym 5";
        let token = find_day(text).unwrap();
        assert_eq!(strip_day(text, &token), "Gym");
    }

    #[test]
    fn bare_numbers() {
        assert!(is_bare_number("7"));
        assert!(is_bare_number(" 28 "));
        assert!(!is_bare_number("7 Gym"));
        assert!(!is_bare_number("123"));
        assert!(!is_bare_number("Gym"));
    }

    #[test]
    fn meeting_with_start_and_end() {
        let times = extract_times("Meeting 9:00 AM 10:30 AM");
        assert_eq!(times.start, hm(9, 0));
        assert_eq!(times.end, hm(10, 30));
        assert_eq!(clean_title(&times.remainder), "Meeting");
    }

    #[test]
    fn meridiem_conversion() {
        assert_eq!(extract_times("12:15 PM").start, hm(12, 15));
        assert_eq!(extract_times("12:15 am").start, hm(0, 15));
        assert_eq!(extract_times("3:45pm").start, hm(15, 45));
        assert_eq!(extract_times("11:00 AM").start, hm(11, 0));
        assert_eq!(extract_times("18:20").start, hm(18, 20));
    }

    #[test]
    fn single_time_has_no_end() {
        let times = extract_times("Lunch 12:30");
        assert_eq!(times.start, hm(12, 30));
        assert_eq!(times.end, None);
        assert_eq!(clean_title(&times.remainder), "Lunch");
    }

    #[test]
    fn impossible_times_are_left_in_the_title() {
        let times = extract_times("Score 27:90");
        assert_eq!(times.start, None);
        assert_eq!(times.remainder, "Score 27:90");

        let times = extract_times("Shift 13:00 PM");
        assert_eq!(times.start, None);
    }

    #[test]
    fn title_without_times_is_untouched() {
        let times = extract_times("Dentist");
        assert_eq!(times.start, None);
        assert_eq!(times.end, None);
        assert_eq!(times.remainder, "Dentist");
    }

    #[test]
    fn cleaning_drops_symbols_and_collapses_spaces() {
        assert_eq!(clean_title("  Team   sync!!  "), "Team sync");
        assert_eq!(clean_title("Pay rent (£800)"), "Pay rent 800");
        assert_eq!(clean_title("Check-in:\tgate 4"), "Check-in: gate 4");
        assert_eq!(clean_title("***"), "");
    }

    #[test]
    fn night_shift_markers() {
        assert!(is_night_shift("14 C"));
        assert!(is_night_shift("c"));
        assert!(is_night_shift("3 ☾"));
        assert!(is_night_shift("🌙"));
        assert!(!is_night_shift("15"));
        assert!(!is_night_shift("15 D"));
    }
}
