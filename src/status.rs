//! Program status classification. Pure functions over a supplied "now" —
//! statuses are derived on demand, never stored.

use chrono::{DateTime, Utc};

use crate::api::Program;

/// Temporal relationship of a program to a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramStatus {
    Now,
    Past,
    Future,
}

/// NOW iff `now ∈ [start, end)`. The half-open end means a program flips
/// to PAST the instant it ends.
pub fn classify(program: &Program, now: DateTime<Utc>) -> ProgramStatus {
    if now >= program.end {
        ProgramStatus::Past
    } else if now >= program.start {
        ProgramStatus::Now
    } else {
        ProgramStatus::Future
    }
}

/// Elapsed percentage of the program at `now`, clamped to `[0, 100]`.
pub fn elapsed_progress(program: &Program, now: DateTime<Utc>) -> f64 {
    if now < program.start {
        return 0.0;
    }
    if now >= program.end {
        return 100.0;
    }
    let total = (program.end - program.start).num_milliseconds();
    if total <= 0 {
        return 100.0;
    }
    let elapsed = (now - program.start).num_milliseconds();
    (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn program(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> Program {
        Program {
            program_id: "p1".into(),
            channel_id: "c1".into(),
            title: "t".into(),
            category: None,
            description: None,
            start: Utc.with_ymd_and_hms(2026, 1, 22, start_h, start_m, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 1, 22, end_h, end_m, 0).unwrap(),
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 22, h, m, 0).unwrap()
    }

    #[test]
    fn boundaries_are_half_open() {
        let p = program(18, 0, 18, 30);
        assert_eq!(classify(&p, p.start), ProgramStatus::Now);
        assert_eq!(classify(&p, p.end), ProgramStatus::Past);
        assert_eq!(classify(&p, p.start - Duration::seconds(1)), ProgramStatus::Future);
        assert_eq!(classify(&p, p.end - Duration::seconds(1)), ProgramStatus::Now);
    }

    #[test]
    fn midpoint_progress_is_fifty() {
        // [18:00, 18:30) at 18:15
        let p = program(18, 0, 18, 30);
        assert_eq!(classify(&p, at(18, 15)), ProgramStatus::Now);
        assert_eq!(elapsed_progress(&p, at(18, 15)), 50.0);
    }

    #[test]
    fn progress_is_exact_at_the_edges() {
        let p = program(18, 0, 18, 30);
        assert_eq!(elapsed_progress(&p, at(17, 0)), 0.0);
        assert_eq!(elapsed_progress(&p, p.start), 0.0);
        assert_eq!(elapsed_progress(&p, p.end), 100.0);
        assert_eq!(elapsed_progress(&p, at(23, 0)), 100.0);
    }

    #[test]
    fn progress_is_monotone_as_now_advances() {
        let p = program(18, 0, 21, 0);
        let mut last = -1.0;
        let mut now = at(17, 30);
        while now <= at(21, 30) {
            let prog = elapsed_progress(&p, now);
            assert!(prog >= last, "regressed at {now}");
            assert!((0.0..=100.0).contains(&prog));
            last = prog;
            now += Duration::minutes(7);
        }
    }
}
