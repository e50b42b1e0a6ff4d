//! Day anchors for the guide's day bar: Today, Tonight, Tomorrow, then the
//! next four calendar days. Recomputed when the local calendar day rolls
//! over so the bar never keeps showing yesterday's "Today".

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::timewin::{local_instant, TimeWindow};

pub const TODAY_ID: &str = "today";
pub const TONIGHT_ID: &str = "tonight";
pub const TOMORROW_ID: &str = "tomorrow";

/// Hour at which "Tonight" begins.
const TONIGHT_START_HOUR: u32 = 18;
/// Hour at which a future day's guide window opens.
const DAY_START_HOUR: u32 = 6;
/// Extra calendar days after Tomorrow.
const EXTRA_DAYS: i64 = 4;

/// A selectable day anchor. Replaced wholesale on recompute, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct DayOption {
    pub id: String,
    pub label: String,
    pub anchor_date: NaiveDate,
    pub window: TimeWindow,
}

/// The precomputed option set plus the calendar day it was computed for.
#[derive(Debug, Clone, PartialEq)]
pub struct DayOptions {
    pub options: Vec<DayOption>,
    computed_for: NaiveDate,
}

fn end_of_day(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    local_instant(tz, date, 23, 59, 59, 999)
}

fn weekday_option(tz: Tz, date: NaiveDate) -> DayOption {
    let label = date.format("%a").to_string();
    DayOption {
        id: label.to_lowercase(),
        label,
        anchor_date: date,
        window: TimeWindow::new(
            local_instant(tz, date, DAY_START_HOUR, 0, 0, 0),
            end_of_day(tz, date),
        ),
    }
}

/// Computes the option set for the calendar day containing `now`: Today,
/// Tonight (collapsing onto Today's window once 18:00 has passed),
/// Tomorrow, then four weekday-labeled days.
pub fn compute_day_options(now: DateTime<Utc>, tz: Tz) -> DayOptions {
    let today = now.with_timezone(&tz).date_naive();
    let tomorrow = today + Duration::days(1);

    let mut options = Vec::with_capacity(3 + EXTRA_DAYS as usize);
    options.push(DayOption {
        id: TODAY_ID.to_string(),
        label: "Today".to_string(),
        anchor_date: today,
        window: TimeWindow::new(now, end_of_day(tz, today)),
    });

    let tonight_start = local_instant(tz, today, TONIGHT_START_HOUR, 0, 0, 0).max(now);
    options.push(DayOption {
        id: TONIGHT_ID.to_string(),
        label: "Tonight".to_string(),
        anchor_date: today,
        window: TimeWindow::new(tonight_start, end_of_day(tz, today)),
    });

    options.push(DayOption {
        id: TOMORROW_ID.to_string(),
        label: "Tomorrow".to_string(),
        anchor_date: tomorrow,
        window: TimeWindow::new(
            local_instant(tz, tomorrow, DAY_START_HOUR, 0, 0, 0),
            end_of_day(tz, tomorrow),
        ),
    });

    for offset in 2..2 + EXTRA_DAYS {
        options.push(weekday_option(tz, today + Duration::days(offset)));
    }

    DayOptions {
        options,
        computed_for: today,
    }
}

impl DayOptions {
    /// Matches an arbitrary date by calendar-day equality. Today's date
    /// resolves to the "today" option, never "tonight".
    pub fn find_for_date(&self, date: NaiveDate) -> Option<usize> {
        self.options.iter().position(|o| o.anchor_date == date)
    }

    pub fn position_of(&self, option: &DayOption) -> Option<usize> {
        self.options
            .iter()
            .position(|o| o.id == option.id && o.anchor_date == option.anchor_date)
    }

    /// True once the wall clock has crossed into a different calendar day
    /// than the one this set was computed for.
    pub fn needs_recompute(&self, now: DateTime<Utc>, tz: Tz) -> bool {
        now.with_timezone(&tz).date_naive() != self.computed_for
    }

    pub fn today(&self) -> &DayOption {
        &self.options[0]
    }

    /// Steps from `current` by `delta` positions. Beyond the precomputed
    /// list the adjacent calendar day is synthesized; navigating earlier
    /// than today is disallowed.
    pub fn step(&self, current: &DayOption, delta: i64, now: DateTime<Utc>, tz: Tz) -> Option<DayOption> {
        if delta == 0 {
            return Some(current.clone());
        }
        if let Some(index) = self.position_of(current) {
            let target = index as i64 + delta;
            if target < 0 {
                return None;
            }
            if (target as usize) < self.options.len() {
                return Some(self.options[target as usize].clone());
            }
            let last = &self.options[self.options.len() - 1];
            let extra = target - self.options.len() as i64 + 1;
            return synthesize_option(last.anchor_date + Duration::days(extra), now, tz);
        }
        // ad-hoc option not in the set: step by calendar day
        let date = current.anchor_date + Duration::days(delta.signum());
        if let Some(index) = self.find_for_date(date) {
            return Some(self.options[index].clone());
        }
        synthesize_option(date, now, tz)
    }
}

/// Synthesizes an ad-hoc option for a date outside the precomputed set,
/// in the weekday-label format. Dates before today are refused.
pub fn synthesize_option(date: NaiveDate, now: DateTime<Utc>, tz: Tz) -> Option<DayOption> {
    let today = now.with_timezone(&tz).date_naive();
    if date < today {
        return None;
    }
    Some(weekday_option(tz, date))
}
