//! The reconstructor's output model: events, the month they were read against,
//! and the small amount of month arithmetic every stage agrees on.

use crate::error::CalendarError;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// How marked dates turn into events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalendarMode {
    /// Free-form titled events.
    #[default]
    Standard,
    /// Every marked date is a `dayshift` or `nightshift`.
    ShiftTracking,
}

impl FromStr for CalendarMode {
    type Err = CalendarError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(CalendarMode::Standard),
            "shift-tracking" | "shifttracking" | "shift" => Ok(CalendarMode::ShiftTracking),
            _ => Err(CalendarError::UnknownMode(value.to_string())),
        }
    }
}

impl fmt::Display for CalendarMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarMode::Standard => f.write_str("standard"),
            CalendarMode::ShiftTracking => f.write_str("shift-tracking"),
        }
    }
}

/// Which month a day number belongs to, relative to the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonthContext {
    Previous,
    Current,
    Next,
}

impl MonthContext {
    pub fn offset(self) -> i32 {
        match self {
            MonthContext::Previous => -1,
            MonthContext::Current => 0,
            MonthContext::Next => 1,
        }
    }
}

/// A validated (year, month) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalendarError::InvalidYear {
                year,
                min: MIN_YEAR,
                max: MAX_YEAR,
            });
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Moves by `months`, rolling the year over at the 1/12 boundary.
    pub fn offset(self, months: i32) -> Self {
        let zero_based = self.year * 12 + self.month as i32 - 1 + months;
        Self {
            year: zero_based.div_euclid(12),
            month: zero_based.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn days(self) -> u32 {
        match self.month {
            4 | 6 | 9 | 11 => 30,
            2 if NaiveDate::from_ymd_opt(self.year, 2, 29).is_some() => 29,
            2 => 28,
            _ => 31,
        }
    }

    /// The calendar date for `day`, if this month has one.
    pub fn date(self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A single dated entry read off the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default, with = "clock_time", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "clock_time", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
}

/// Everything reconstructed from one calendar photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCalendarData {
    pub year: i32,
    pub month: u32,
    pub events: Vec<CalendarEvent>,
}

/// `"HH:MM"` (de)serialization for optional wall-clock times.
mod clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(time) => serializer.serialize_str(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|text| NaiveTime::parse_from_str(&text, FORMAT).map_err(serde::de::Error::custom))
            .transpose()
    }
}
