//! Parsing and validation of user-entered intake data.
//!
//! The engine tolerates any amount; rejection of non-positive amounts
//! happens here, at the point of entry.

use crate::{Error, IntakeRecord, Result};
use chrono::{DateTime, NaiveTime, TimeZone, Utc};

/// Parse an amount in milligrams, rejecting anything not strictly positive
pub fn parse_amount_mg(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let mg: f64 = trimmed
        .parse()
        .map_err(|_| Error::InvalidInput(format!("'{}' is not a number", trimmed)))?;
    validate_amount_mg(mg)?;
    Ok(mg)
}

/// Reject non-finite and non-positive amounts
pub fn validate_amount_mg(mg: f64) -> Result<()> {
    if !mg.is_finite() || mg <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "caffeine amount must be a positive number of mg, got {}",
            mg
        )));
    }
    Ok(())
}

/// Parse a time of day as `HH:MM` or `HH:MM:SS`
pub fn parse_time_of_day(text: &str) -> Result<NaiveTime> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| {
            Error::InvalidInput(format!(
                "'{}' is not a time of day (expected HH:MM)",
                trimmed
            ))
        })
}

/// Today's instant at the hour and minute of `time`, seconds dropped
///
/// "Today" is the calendar day of `now` in its own time zone. Falls back to
/// `now` if the wall-clock time does not exist on that day.
pub fn intake_time_today<Tz: TimeZone>(time: NaiveTime, now: &DateTime<Tz>) -> DateTime<Tz> {
    use chrono::Timelike;

    let truncated = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);
    now.timezone()
        .from_local_datetime(&now.date_naive().and_time(truncated))
        .earliest()
        .unwrap_or_else(|| now.clone())
}

/// Build a validated intake record from entered text
pub fn new_intake(amount_text: &str, consumed_at: DateTime<Utc>) -> Result<IntakeRecord> {
    let mg = parse_amount_mg(amount_text)?;
    Ok(IntakeRecord::new(mg, consumed_at))
}
