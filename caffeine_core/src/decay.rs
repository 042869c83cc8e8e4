//! Single-compartment exponential decay of one intake.
//!
//! residual = amount * 0.5^(elapsed_hours / HALF_LIFE_HOURS)

use crate::{IntakeRecord, HALF_LIFE_HOURS};
use chrono::{DateTime, Utc};

/// Fractional hours from `from` to `to` (negative if `to` is earlier)
pub fn elapsed_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

/// Residual caffeine (mg) left from `record` at instant `at`
///
/// Evaluating before the record was consumed yields zero. Amounts are not
/// clamped: a non-positive amount contributes a correspondingly signed
/// residual.
pub fn residual_at(record: &IntakeRecord, at: DateTime<Utc>) -> f64 {
    let hours = elapsed_hours(record.consumed_at, at);
    if hours < 0.0 {
        return 0.0;
    }

    record.caffeine_mg * 0.5_f64.powf(hours / HALF_LIFE_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record_at(mg: f64, at: DateTime<Utc>) -> IntakeRecord {
        IntakeRecord::new(mg, at)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 24, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_full_amount_at_consumption() {
        let record = record_at(96.0, t0());
        assert_eq!(residual_at(&record, t0()), 96.0);
    }

    #[test]
    fn test_zero_before_consumption() {
        let record = record_at(96.0, t0());
        assert_eq!(residual_at(&record, t0() - Duration::seconds(1)), 0.0);
        assert_eq!(residual_at(&record, t0() - Duration::days(3)), 0.0);
    }

    #[test]
    fn test_half_life() {
        let record = record_at(100.0, t0());
        let residual = residual_at(&record, t0() + Duration::hours(5));
        assert!((residual - 50.0).abs() < 1e-9);

        let residual = residual_at(&record, t0() + Duration::hours(10));
        assert!((residual - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_and_positive() {
        let record = record_at(80.0, t0());
        let mut previous = residual_at(&record, t0());
        for minutes in (30..=72 * 60).step_by(30) {
            let current = residual_at(&record, t0() + Duration::minutes(minutes));
            assert!(current < previous, "residual must decrease at {} min", minutes);
            assert!(current > 0.0);
            previous = current;
        }
    }

    #[test]
    fn test_non_positive_amount_is_not_clamped() {
        let record = record_at(-40.0, t0());
        let residual = residual_at(&record, t0() + Duration::hours(5));
        assert!((residual + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_elapsed_hours_fractional() {
        let hours = elapsed_hours(t0(), t0() + Duration::minutes(90));
        assert!((hours - 1.5).abs() < 1e-12);
        assert!(elapsed_hours(t0(), t0() - Duration::minutes(30)) < 0.0);
    }
}
