use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use tracing::warn;

use crate::types::Schedule;

/// Compute the next fire time strictly after `from`.
///
/// Returns `None` when the schedule is exhausted (`Once` after its single
/// fire) or malformed (an invalid cron expression, already logged at the
/// call site).
pub fn compute_next_run(schedule: &Schedule, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match schedule {
        Schedule::Once { at } => {
            if *at > from {
                Some(*at)
            } else {
                None
            }
        }
        Schedule::Interval { seconds } => Some(from + Duration::seconds(*seconds as i64)),
        Schedule::Daily { hour, minute } => next_daily(from, *hour, *minute),
        Schedule::Weekly { weekday, hour, minute } => next_weekly(from, *weekday, *hour, *minute),
        Schedule::Cron { expr } => next_cron(expr, from),
    }
}

fn next_daily(from: DateTime<Utc>, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    let today = Utc
        .with_ymd_and_hms(from.year(), from.month(), from.day(), hour, minute, 0)
        .single()?;
    if today > from {
        Some(today)
    } else {
        Some(today + Duration::days(1))
    }
}

fn next_weekly(from: DateTime<Utc>, weekday: u32, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    let candidate_today = Utc
        .with_ymd_and_hms(from.year(), from.month(), from.day(), hour, minute, 0)
        .single()?;
    let current_weekday = from.weekday().num_days_from_monday();
    let mut days_ahead = (weekday as i64 - current_weekday as i64).rem_euclid(7);
    if days_ahead == 0 && candidate_today <= from {
        days_ahead = 7;
    }
    Some(candidate_today + Duration::days(days_ahead))
}

/// Real cron support via the `cron` crate, unlike the stubbed-out variant
/// this was adapted from. The crate expects a 6-field expression
/// (seconds minute hour day-of-month month day-of-week); section 4.C's
/// 5-field contract omits seconds, so it's prefixed with `"0 "` before
/// parsing.
fn next_cron(expr: &str, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let six_field = format!("0 {expr}");
    match cron::Schedule::from_str(&six_field) {
        Ok(schedule) => schedule.after(&from).next(),
        Err(e) => {
            warn!(%expr, error = %e, "invalid cron expression");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn once_fires_only_in_the_future() {
        let now = Utc::now();
        let past = Schedule::Once { at: now - Duration::seconds(10) };
        assert_eq!(compute_next_run(&past, now), None);

        let future = Schedule::Once { at: now + Duration::seconds(10) };
        assert!(compute_next_run(&future, now).is_some());
    }

    #[test]
    fn interval_adds_seconds() {
        let now = Utc::now();
        let sched = Schedule::Interval { seconds: 900 };
        let next = compute_next_run(&sched, now).unwrap();
        assert_eq!((next - now).num_seconds(), 900);
    }

    #[test]
    fn daily_rolls_to_tomorrow_if_time_passed() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap();
        let sched = Schedule::Daily { hour: 7, minute: 0 };
        let next = compute_next_run(&sched, from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 2, 7, 0, 0).unwrap());
    }

    #[test]
    fn weekly_finds_next_monday() {
        // 2026-01-01 is a Thursday.
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let sched = Schedule::Weekly { weekday: 0, hour: 8, minute: 0 };
        let next = compute_next_run(&sched, from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap());
    }

    #[test]
    fn cron_every_minute_fires_next_minute_boundary() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 30).unwrap();
        let sched = Schedule::Cron { expr: "* * * * *".to_string() };
        let next = compute_next_run(&sched, from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 1, 9, 1, 0).unwrap());
    }

    #[test]
    fn invalid_cron_returns_none() {
        let sched = Schedule::Cron { expr: "not a cron".to_string() };
        assert_eq!(compute_next_run(&sched, Utc::now()), None);
    }
}
