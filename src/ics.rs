//! iCalendar (RFC 5545) export of reconstructed events.
//!
//! Events without a start time become all-day entries. Timed events use floating
//! local times, since a photographed calendar carries no time zone. Folding and
//! CRLF line endings come from `ical`'s emitter.

use crate::core_modules::calendar_event::{CalendarEvent, ParsedCalendarData};
use chrono::{Days, NaiveDateTime, TimeDelta};
use ical::generator::{Emitter, IcalCalendarBuilder, IcalEvent, Property};
use ical::{ical_param, ical_property};

const PRODUCT_ID: &str = "-//calendar_vision//calendar_vision 0.1//EN";
const DATE: &str = "%Y%m%d";
const DATE_TIME: &str = "%Y%m%dT%H%M%S";

/// Serializes `data` as a VCALENDAR document. `stamp` is a UTC instant and becomes
/// every event's DTSTAMP.
pub fn to_ical(data: &ParsedCalendarData, stamp: NaiveDateTime) -> String {
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(PRODUCT_ID)
        .build();
    calendar
        .events
        .extend(data.events.iter().map(|event| to_vevent(event, stamp)));
    calendar.generate()
}

fn to_vevent(event: &CalendarEvent, stamp: NaiveDateTime) -> IcalEvent {
    let mut vevent = IcalEvent::new();
    let properties = &mut vevent.properties;
    properties.push(ical_property!("UID", format!("{}@calendar_vision", event.id)));
    properties.push(ical_property!(
        "DTSTAMP",
        format!("{}Z", stamp.format(DATE_TIME))
    ));

    match event.start_time {
        Some(start_time) => {
            let start = event.date.and_time(start_time);
            let end = event
                .end_time
                .map(|end_time| event.date.and_time(end_time))
                .filter(|end| *end > start)
                .unwrap_or(start + TimeDelta::hours(1));
            properties.push(ical_property!("DTSTART", start.format(DATE_TIME).to_string()));
            properties.push(ical_property!("DTEND", end.format(DATE_TIME).to_string()));
        }
        None => {
            let next_day = event.date.checked_add_days(Days::new(1)).unwrap_or(event.date);
            properties.push(ical_property!(
                "DTSTART",
                event.date.format(DATE).to_string(),
                ical_param!("VALUE", "DATE")
            ));
            properties.push(ical_property!(
                "DTEND",
                next_day.format(DATE).to_string(),
                ical_param!("VALUE", "DATE")
            ));
        }
    }

    properties.push(ical_property!("SUMMARY", escape_text(&event.title)));
    vevent
}

/// Escapes a TEXT value: backslash, semicolon, comma and newlines.
/// The emitter writes property values as given.
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}
