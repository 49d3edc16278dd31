// THEORY:
// The `MonthTracker` decides, one day number at a time, whether a marked cell belongs
// to the requested month or to one of its neighbours. A printed month grid pads its
// first week with the tail of the previous month and its last weeks with the head of
// the next, so the number alone is ambiguous: "30" in the top row is almost always
// last month, "3" in the bottom row almost always next month.
//
// Key architectural principles:
// 1.  **Single Transition Function**: All state lives in one struct and changes only
//     in `observe`. Fragments must be fed in reading order; the tracker has no other
//     view of the page.
// 2.  **Ordered Rules**: `observe` evaluates a fixed list of rules and the first match
//     wins. The rules overlap heavily, so their order is part of the behavior and is
//     encoded once, in `classify`.
// 3.  **Observable Decisions**: Every transition reports which rule fired. The
//     reconstructor logs it, and tests pin each rule separately.
// 4.  **Sticky Overflow**: Once the page has run into the next month, sequential days
//     stay there. The lead-in works the same way in the other direction until the
//     first of the month shows up.

use crate::core_modules::calendar_event::{MonthContext, YearMonth};

/// Which disambiguation rule produced a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Late day in the first row before the month has started.
    LeadingOverflow,
    /// First-row wrap from the previous month's end to day 1..5.
    FirstRowRollover,
    /// Late-row wrap from day 25+ to day 1..5.
    TailRollover,
    /// Small day in row 4+ after the month's tail was seen.
    AfterTail,
    /// Small day opening row 4+ with nothing seen before it.
    FreshTrailingWeek,
    /// Row 4+ day that the requested month cannot hold.
    BeyondMonthEnd,
    /// Late day starting a new row 3+ after the month was entered.
    TailReconfirmed,
    /// Day directly following the previous one.
    Sequential,
    /// Jump into the middle of the month before it was entered.
    MidMonthJump,
    /// Nothing else matched; the day belongs to the requested month.
    Fallback,
}

/// The outcome of feeding one day into the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub context: MonthContext,
    pub rule: Rule,
}

#[derive(Debug, Clone)]
pub struct MonthTracker {
    days_in_month: u32,
    context: Option<MonthContext>,
    last_day: Option<u32>,
    last_week: Option<usize>,
    entered_current: bool,
    transitioned_in_first_row: bool,
    tail_seen: bool,
}

impl MonthTracker {
    pub fn new(month: YearMonth) -> Self {
        Self {
            days_in_month: month.days(),
            context: None,
            last_day: None,
            last_week: None,
            entered_current: false,
            transitioned_in_first_row: false,
            tail_seen: false,
        }
    }

    pub fn entered_current(&self) -> bool {
        self.entered_current
    }

    pub fn tail_seen(&self) -> bool {
        self.tail_seen
    }

    /// Classifies `day` found in week row `week` and advances the state.
    pub fn observe(&mut self, day: u32, week: usize) -> Transition {
        let transition = self.classify(day, week);

        self.context = Some(transition.context);
        self.last_day = Some(day);
        self.last_week = Some(week);
        if day >= 24 && week >= 3 {
            self.tail_seen = true;
        }

        transition
    }

    fn classify(&mut self, day: u32, week: usize) -> Transition {
        use MonthContext::*;

        let to = |context, rule| Transition { context, rule };
        let last = self.last_day;
        let in_lead_in = matches!(self.context, None | Some(Previous));
        let fresh_row = self.last_week != Some(week);

        if week == 0 && day >= 25 && in_lead_in && !self.entered_current {
            return to(Previous, Rule::LeadingOverflow);
        }
        if week == 0
            && last.is_some_and(|l| l >= 28)
            && day <= 5
            && !self.transitioned_in_first_row
        {
            self.transitioned_in_first_row = true;
            self.entered_current = true;
            return to(Current, Rule::FirstRowRollover);
        }
        if week >= 3 && last.is_some_and(|l| l >= 25) && day <= 5 {
            return to(Next, Rule::TailRollover);
        }
        if week >= 4 && day <= 10 && self.tail_seen {
            return to(Next, Rule::AfterTail);
        }
        if week >= 4 && day <= 5 && last.is_none() {
            return to(Next, Rule::FreshTrailingWeek);
        }
        if week >= 4 && day > self.days_in_month {
            return to(Next, Rule::BeyondMonthEnd);
        }
        if fresh_row && week >= 3 && day >= 25 && self.entered_current {
            return to(Current, Rule::TailReconfirmed);
        }

        let sequential = match last {
            Some(last) => day == last + 1,
            None => day == 1,
        };
        if sequential {
            if week > 0 && !self.entered_current {
                self.entered_current = true;
            }
            let context = if self.context == Some(Next) { Next } else { Current };
            return to(context, Rule::Sequential);
        }

        if !self.entered_current && (6..=24).contains(&day) {
            self.entered_current = true;
            return to(Current, Rule::MidMonthJump);
        }

        to(Current, Rule::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MonthContext::*;

    fn tracker(year: i32, month: u32) -> MonthTracker {
        MonthTracker::new(YearMonth::new(year, month).unwrap())
    }

    fn feed(tracker: &mut MonthTracker, cells: &[(u32, usize)]) -> Vec<Transition> {
        cells
            .iter()
            .map(|&(day, week)| tracker.observe(day, week))
            .collect()
    }

    #[test]
    fn leading_overflow_stays_previous_until_day_one() {
        let mut t = tracker(2024, 2);
        let steps = feed(&mut t, &[(29, 0), (30, 0), (31, 0), (1, 0), (2, 0)]);
        let contexts: Vec<_> = steps.iter().map(|s| s.context).collect();
        assert_eq!(contexts, vec![Previous, Previous, Previous, Current, Current]);
        assert_eq!(steps[0].rule, Rule::LeadingOverflow);
        assert_eq!(steps[3].rule, Rule::FirstRowRollover);
        assert_eq!(steps[4].rule, Rule::Sequential);
        assert!(t.entered_current());
    }

    #[test]
    fn month_starting_on_the_first_cell_is_current() {
        let mut t = tracker(2024, 9);
        let steps = feed(&mut t, &[(1, 0), (2, 0), (3, 0)]);
        assert!(steps.iter().all(|s| s.context == Current));
        assert!(steps.iter().all(|s| s.rule == Rule::Sequential));
    }

    #[test]
    fn first_row_rollover_happens_once() {
        let mut t = tracker(2024, 5);
        assert_eq!(t.observe(30, 0).rule, Rule::LeadingOverflow);
        assert_eq!(t.observe(1, 0).rule, Rule::FirstRowRollover);
        // A second wrap in the first row is not another month boundary.
        t.observe(28, 0);
        let again = t.observe(2, 0);
        assert_ne!(again.rule, Rule::FirstRowRollover);
        assert_eq!(again.context, Current);
    }

    #[test]
    fn tail_rollover_moves_into_next_month() {
        let mut t = tracker(2024, 2);
        feed(&mut t, &[(1, 0), (14, 2)]);
        let tail = t.observe(29, 4);
        assert_eq!(tail, Transition { context: Current, rule: Rule::TailReconfirmed });
        assert!(t.tail_seen());
        assert_eq!(t.observe(1, 4), Transition { context: Next, rule: Rule::TailRollover });
        assert_eq!(t.observe(2, 4), Transition { context: Next, rule: Rule::AfterTail });
    }

    #[test]
    fn small_day_after_tail_is_next_month() {
        let mut t = tracker(2024, 3);
        feed(&mut t, &[(4, 0), (27, 3)]);
        assert!(t.tail_seen());
        assert_eq!(t.observe(8, 5), Transition { context: Next, rule: Rule::AfterTail });
    }

    #[test]
    fn small_day_alone_in_a_trailing_week_is_next_month() {
        let mut t = tracker(2024, 6);
        assert_eq!(
            t.observe(3, 4),
            Transition { context: Next, rule: Rule::FreshTrailingWeek }
        );
    }

    #[test]
    fn day_past_month_end_in_a_late_row_is_next_month() {
        let mut t = tracker(2023, 2);
        feed(&mut t, &[(6, 1)]);
        assert_eq!(
            t.observe(30, 4),
            Transition { context: Next, rule: Rule::BeyondMonthEnd }
        );
    }

    #[test]
    fn sequential_days_stick_to_next_month() {
        let mut t = tracker(2024, 4);
        feed(&mut t, &[(10, 1), (26, 4)]);
        assert_eq!(t.observe(1, 4).context, Next);
        // Row 3 is too early for the after-tail rule; the sticky context carries the run.
        let mut t = tracker(2024, 4);
        feed(&mut t, &[(10, 1), (28, 3)]);
        assert_eq!(t.observe(1, 3).context, Next);
        assert_eq!(t.observe(2, 3), Transition { context: Next, rule: Rule::Sequential });
    }

    #[test]
    fn sequential_day_in_a_later_row_enters_the_month() {
        let mut t = tracker(2024, 7);
        assert_eq!(t.observe(1, 1).rule, Rule::Sequential);
        assert!(t.entered_current());
    }

    #[test]
    fn mid_month_jump_enters_the_month() {
        let mut t = tracker(2024, 7);
        let step = t.observe(12, 2);
        assert_eq!(step, Transition { context: Current, rule: Rule::MidMonthJump });
        assert!(t.entered_current());
        assert_eq!(t.observe(20, 3).rule, Rule::Fallback);
    }

    #[test]
    fn late_day_not_opening_a_row_falls_back() {
        let mut t = tracker(2024, 1);
        feed(&mut t, &[(2, 0), (10, 1), (25, 3)]);
        // Same row, not sequential, already entered.
        assert_eq!(t.observe(28, 3), Transition { context: Current, rule: Rule::Fallback });
    }
}
