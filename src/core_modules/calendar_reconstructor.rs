// THEORY:
// The `CalendarReconstructor` is the semantic layer of the engine. It receives loose
// text fragments with pixel positions and decides which of them are dated events,
// on which day, in which month, and under what title.
//
// Key architectural principles & algorithm steps:
// 1.  **Own the Order**: Text recognition may finish in any order. The reconstructor
//     re-derives reading order from geometry before anything else, so the result
//     never depends on how fragments were produced.
// 2.  **Rows Before Days**: Week rows are clustered from the fragments carrying day
//     numbers, and every fragment snaps to its nearest row. The month tracker needs
//     the row to tell "30" on the first line from "30" on the last.
// 3.  **One Walk**: Fragments are visited once in reading order. Each day number is
//     fed to the `MonthTracker`, even when it produces no event, because the tracker
//     reasons about what came before.
// 4.  **Titles From Neighbours**: A bare day number borrows its title from the next
//     fragment when that fragment sits beside it or directly underneath.
// 5.  **Reject Calls, Not Fragments**: An impossible (year, month) fails the call up
//     front. A fragment that cannot become an event is skipped with a debug line.

use crate::core_modules::calendar_event::{
    CalendarEvent, CalendarMode, ParsedCalendarData, YearMonth,
};
use crate::core_modules::event_text::{
    clean_title, extract_times, find_day, is_bare_number, is_night_shift, strip_day,
};
use crate::core_modules::fragment::{canonical_order, RecognizedFragment};
use crate::core_modules::month_tracker::MonthTracker;
use crate::core_modules::week_rows::WeekRows;
use crate::error::CalendarError;
use log::debug;
use uuid::Uuid;

/// A neighbour within this many pixels vertically counts as the same row.
const SAME_ROW_DY: i64 = 60;
/// A neighbour up to this far below counts when it is also horizontally aligned.
const BELOW_DY: i64 = 100;
const BELOW_DX: i64 = 50;
/// No neighbour farther than this horizontally is ever a title.
const MAX_TITLE_DX: i64 = 150;

/// Turns recognized fragments into dated events for `year`/`month`.
///
/// Fails only when `year` or `month` is out of range; that check happens before any
/// fragment is looked at.
pub fn reconstruct(
    fragments: &[RecognizedFragment],
    year: i32,
    month: u32,
    mode: CalendarMode,
) -> Result<ParsedCalendarData, CalendarError> {
    let requested = YearMonth::new(year, month)?;

    let ordered = canonical_order(fragments.to_vec());
    let rows = WeekRows::infer(&ordered);
    let mut tracker = MonthTracker::new(requested);
    let mut events = Vec::new();

    for (index, fragment) in ordered.iter().enumerate() {
        let Some(token) = find_day(&fragment.text) else {
            debug!("skipping fragment without a day number: {:?}", fragment.text);
            continue;
        };

        let week = rows.week_index(fragment);
        let transition = tracker.observe(token.day, week);
        debug!(
            "day {} in week {} -> {:?} ({:?})",
            token.day, week, transition.context, transition.rule
        );

        let remainder = strip_day(&fragment.text, &token);
        let Some(title) = resolve_title(fragment, remainder, ordered.get(index + 1), mode) else {
            debug!("no title for day {} in week {}", token.day, week);
            continue;
        };

        let Some(date) = requested.offset(transition.context.offset()).date(token.day) else {
            debug!(
                "day {} does not exist in {}",
                token.day,
                requested.offset(transition.context.offset())
            );
            continue;
        };

        let times = extract_times(&title);
        events.push(CalendarEvent {
            id: Uuid::new_v4(),
            title: clean_title(&times.remainder),
            date,
            start_time: times.start,
            end_time: times.end,
        });
    }

    debug!(
        "reconstructed {} events from {} fragments for {}",
        events.len(),
        fragments.len(),
        requested
    );

    Ok(ParsedCalendarData {
        year,
        month,
        events,
    })
}

/// The raw title for a dated fragment, before times are pulled out and it is cleaned.
fn resolve_title(
    fragment: &RecognizedFragment,
    remainder: String,
    next: Option<&RecognizedFragment>,
    mode: CalendarMode,
) -> Option<String> {
    match mode {
        // Every marked day is a shift; whatever else is written there is ignored.
        CalendarMode::ShiftTracking => {
            let shift = if is_night_shift(&fragment.text) {
                "nightshift"
            } else {
                "dayshift"
            };
            Some(shift.to_string())
        }
        CalendarMode::Standard if remainder.chars().count() > 1 => Some(remainder),
        CalendarMode::Standard => next
            .filter(|candidate| is_adjacent(fragment, candidate))
            .filter(|candidate| !is_bare_number(&candidate.text))
            .map(|candidate| candidate.text.trim().to_string()),
    }
}

/// Whether `candidate` sits beside `fragment` or directly underneath it.
fn is_adjacent(fragment: &RecognizedFragment, candidate: &RecognizedFragment) -> bool {
    let dx = (candidate.region.x as i64 - fragment.region.x as i64).abs();
    let dy = candidate.region.y as i64 - fragment.region.y as i64;

    let same_row = dy.abs() <= SAME_ROW_DY;
    let below = dy > 0 && dy <= BELOW_DY && dx <= BELOW_DX;
    (same_row || below) && dx <= MAX_TITLE_DX
}
