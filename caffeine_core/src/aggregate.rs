//! Aggregation over the full intake history.
//!
//! All functions here are pure over the records, the profile and a
//! caller-supplied "now". Calendar-day and bedtime calculations happen in the
//! time zone carried by `now`, so callers pass `Local::now()` for the user's
//! wall clock and a fixed offset in tests.

use crate::decay::residual_at;
use crate::{IntakeRecord, UserProfile};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

/// Total residual caffeine (mg) at `at`, summed over every record
pub fn total_residual_at(records: &[IntakeRecord], at: DateTime<Utc>) -> f64 {
    records.iter().map(|r| residual_at(r, at)).sum()
}

/// Most recent intake, by consumption time
pub fn latest_intake(records: &[IntakeRecord]) -> Option<&IntakeRecord> {
    records.iter().max_by_key(|r| r.consumed_at)
}

/// Consumption time of the most recent intake
pub fn latest_intake_instant(records: &[IntakeRecord]) -> Option<DateTime<Utc>> {
    latest_intake(records).map(|r| r.consumed_at)
}

/// Records consumed on the same calendar day as `now`, newest first
pub fn today_records<Tz: TimeZone>(
    records: &[IntakeRecord],
    now: &DateTime<Tz>,
) -> Vec<IntakeRecord> {
    let is_today = same_local_day(now);
    let mut todays: Vec<_> = records.iter().filter(|r| is_today(*r)).cloned().collect();
    todays.sort_by(|a, b| b.consumed_at.cmp(&a.consumed_at));
    todays
}

/// Sum of amounts consumed on the same calendar day as `now`
pub fn today_total_mg<Tz: TimeZone>(records: &[IntakeRecord], now: &DateTime<Tz>) -> f64 {
    let is_today = same_local_day(now);
    records
        .iter()
        .filter(|r| is_today(*r))
        .map(|r| r.caffeine_mg)
        .sum()
}

/// Predicate matching records consumed on `now`'s calendar day, in `now`'s zone
fn same_local_day<Tz: TimeZone>(now: &DateTime<Tz>) -> impl Fn(&IntakeRecord) -> bool {
    let tz = now.timezone();
    let today = now.date_naive();
    move |r| r.consumed_at.with_timezone(&tz).date_naive() == today
}

/// Next occurrence of the profile's bedtime at or after `now`
pub fn bedtime_reference_instant<Tz: TimeZone>(
    profile: &UserProfile,
    now: &DateTime<Tz>,
) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();

    if let Some(tonight) = resolve_local(&tz, today.and_time(profile.bedtime)) {
        if tonight >= *now {
            return tonight;
        }
    }

    today
        .succ_opt()
        .and_then(|tomorrow| resolve_local(&tz, tomorrow.and_time(profile.bedtime)))
        .unwrap_or_else(|| now.clone() + Duration::days(1))
}

/// Projected residual (mg) at the next bedtime
pub fn bedtime_residual_estimate_mg<Tz: TimeZone>(
    records: &[IntakeRecord],
    profile: &UserProfile,
    now: &DateTime<Tz>,
) -> f64 {
    let bedtime = bedtime_reference_instant(profile, now);
    total_residual_at(records, bedtime.with_timezone(&Utc))
}

/// Latest intake amount per kilogram of body weight
///
/// Only defined when there is a latest intake, the profile carries a usable
/// weight, and weight-based hints are enabled.
pub fn latest_intake_mg_per_kg(records: &[IntakeRecord], profile: &UserProfile) -> Option<f64> {
    if !profile.use_weight_based_hints {
        return None;
    }

    let latest = latest_intake(records)?;
    let weight_kg = profile.weight_kg()?;
    Some(latest.caffeine_mg / weight_kg)
}

/// Map a wall-clock time to an instant in `tz`
///
/// Ambiguous times (clocks falling back) take the earlier instant; times that
/// do not exist (clocks springing forward) move one hour later.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
}
