//! Time-window algebra for the guide. All operations are pure: windows are
//! immutable values and every transformation returns a new one.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Width of one guide column in minutes.
pub const SLOT_MINUTES: i64 = 30;

/// Default span of a window derived from a search-result selection.
pub const DEFAULT_SPAN_HOURS: i64 = 3;

/// The `[start, end)` interval of guide time currently displayed.
/// Invariant: `start < end`; the constructors below never return a
/// degenerate window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Builds a window, widening `end` to one hour past `start` if the
    /// given bounds are degenerate.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if end > start {
            Self { start, end }
        } else {
            Self {
                start,
                end: start + Duration::hours(1),
            }
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open containment: `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Whether `[start, end)` of `self` intersects the given interval.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        end > self.start && start < self.end
    }
}

/// Window of `duration_hours` straddling `instant` evenly, half before and
/// half after. Non-positive durations are clamped to one hour.
pub fn window_centered_on(instant: DateTime<Utc>, duration_hours: i64) -> TimeWindow {
    let half = Duration::minutes(duration_hours.max(1) * SLOT_MINUTES);
    TimeWindow::new(instant - half, instant + half)
}

/// Window of `duration_hours` beginning exactly at `instant`.
pub fn window_starting_at(instant: DateTime<Utc>, duration_hours: i64) -> TimeWindow {
    TimeWindow::new(instant, instant + Duration::hours(duration_hours.max(1)))
}

/// Rounds down to the nearest :00 or :30 so column boundaries always land
/// on 30-minute marks regardless of the raw window start.
pub fn snap_to_half_hour_floor(instant: DateTime<Utc>) -> DateTime<Utc> {
    let ts = instant.timestamp();
    let snapped = ts - ts.rem_euclid(SLOT_MINUTES * 60);
    DateTime::from_timestamp(snapped, 0).unwrap_or(instant)
}

/// Shifts both bounds by `n` whole days. `n` may be negative.
pub fn shift_by_days(window: TimeWindow, n: i64) -> TimeWindow {
    TimeWindow {
        start: window.start + Duration::days(n),
        end: window.end + Duration::days(n),
    }
}

/// 19:00–22:00 local time on the calendar day of `now`.
pub fn canonical_prime_time_window(now: DateTime<Utc>, tz: Tz) -> TimeWindow {
    let today = now.with_timezone(&tz).date_naive();
    TimeWindow::new(
        local_instant(tz, today, 19, 0, 0, 0),
        local_instant(tz, today, 22, 0, 0, 0),
    )
}

/// 06:00–12:00 local time on the day after `now`.
pub fn canonical_morning_window(now: DateTime<Utc>, tz: Tz) -> TimeWindow {
    let tomorrow = now.with_timezone(&tz).date_naive() + Duration::days(1);
    TimeWindow::new(
        local_instant(tz, tomorrow, 6, 0, 0, 0),
        local_instant(tz, tomorrow, 12, 0, 0, 0),
    )
}

/// Resolves a wall-clock time in `tz` to a UTC instant. DST-ambiguous
/// times take the earliest mapping; times inside a spring-forward gap
/// fall forward one hour.
pub fn local_instant(tz: Tz, date: NaiveDate, hour: u32, min: u32, sec: u32, milli: u32) -> DateTime<Utc> {
    let naive = date
        .and_hms_milli_opt(hour, min, sec, milli)
        .unwrap_or_else(|| date.and_hms_opt(0, 0, 0).unwrap_or_default());
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => match tz.from_local_datetime(&(naive + Duration::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
            LocalResult::None => Utc.from_utc_datetime(&naive),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn centered_window_strictly_contains_instant() {
        let instant = at(2026, 1, 25, 20, 0);
        for hours in [1, 2, 3, 6, 24] {
            let w = window_centered_on(instant, hours);
            assert!(w.start < instant && instant < w.end, "hours={hours}");
            assert_eq!(w.duration(), Duration::hours(hours));
        }
    }

    #[test]
    fn centered_window_matches_search_selection_example() {
        // start 2026-01-25T20:00, 3h span -> 18:30-21:30
        let w = window_centered_on(at(2026, 1, 25, 20, 0), DEFAULT_SPAN_HOURS);
        assert_eq!(w.start, at(2026, 1, 25, 18, 30));
        assert_eq!(w.end, at(2026, 1, 25, 21, 30));
    }

    #[test]
    fn degenerate_duration_is_clamped() {
        let instant = at(2026, 1, 25, 20, 0);
        let w = window_centered_on(instant, 0);
        assert!(w.start < w.end);
        let w = window_starting_at(instant, -5);
        assert!(w.start < w.end);
    }

    #[test]
    fn snap_floors_to_half_hour() {
        assert_eq!(
            snap_to_half_hour_floor(at(2026, 1, 22, 18, 5)),
            at(2026, 1, 22, 18, 0)
        );
        assert_eq!(
            snap_to_half_hour_floor(at(2026, 1, 22, 18, 45)),
            at(2026, 1, 22, 18, 30)
        );
        assert_eq!(
            snap_to_half_hour_floor(at(2026, 1, 22, 18, 30)),
            at(2026, 1, 22, 18, 30)
        );
    }

    #[test]
    fn shift_by_days_round_trips() {
        let w = TimeWindow::new(at(2026, 1, 22, 18, 0), at(2026, 1, 22, 21, 0));
        for n in [-7, -1, 1, 3, 30] {
            assert_eq!(shift_by_days(shift_by_days(w, n), -n), w);
        }
    }

    #[test]
    fn prime_time_is_19_to_22_local() {
        let tz = chrono_tz::America::New_York;
        let now = at(2026, 1, 22, 15, 0); // 10:00 local
        let w = canonical_prime_time_window(now, tz);
        let local_start = w.start.with_timezone(&tz);
        let local_end = w.end.with_timezone(&tz);
        assert_eq!(local_start.format("%H:%M").to_string(), "19:00");
        assert_eq!(local_end.format("%H:%M").to_string(), "22:00");
        assert_eq!(local_start.date_naive(), now.with_timezone(&tz).date_naive());
    }

    #[test]
    fn morning_window_is_tomorrow_06_to_12_local() {
        let tz = chrono_tz::Europe::London;
        let now = at(2026, 1, 22, 23, 30);
        let w = canonical_morning_window(now, tz);
        let local_start = w.start.with_timezone(&tz);
        assert_eq!(local_start.format("%H:%M").to_string(), "06:00");
        assert_eq!(
            local_start.date_naive(),
            now.with_timezone(&tz).date_naive() + Duration::days(1)
        );
        assert_eq!(w.duration(), Duration::hours(6));
    }

    #[test]
    fn half_open_containment() {
        let w = TimeWindow::new(at(2026, 1, 22, 18, 0), at(2026, 1, 22, 21, 0));
        assert!(w.contains(w.start));
        assert!(!w.contains(w.end));
    }
}
