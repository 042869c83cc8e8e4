//! Evaluation engine tying decay, aggregation and classification together.
//!
//! One call produces everything a front end shows for a refresh:
//! - Current residual and the classified state
//! - Today's total intake
//! - Projected residual at the next bedtime
//! - Latest intake per kilogram of body weight (when enabled)

use crate::aggregate::{
    bedtime_reference_instant, latest_intake_instant, latest_intake_mg_per_kg, today_total_mg,
    total_residual_at,
};
use crate::status::{classify, CaffeineStatusSnapshot};
use crate::{IntakeRecord, UserProfile};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// Everything derived from the records and profile at one instant
#[derive(Clone, Debug, Serialize)]
pub struct CaffeineReport {
    pub evaluated_at: DateTime<Utc>,
    pub residual_mg: f64,
    pub status: CaffeineStatusSnapshot,
    pub today_total_mg: f64,
    pub latest_intake_at: Option<DateTime<Utc>>,
    pub bedtime_at: DateTime<Utc>,
    pub bedtime_residual_mg: f64,
    pub latest_intake_mg_per_kg: Option<f64>,
}

/// Evaluate the records and profile at `now`
///
/// Day bucketing and the bedtime projection use the time zone of `now`. A
/// missing profile behaves like the default profile for bedtime and like
/// non-high sensitivity for classification.
pub fn evaluate<Tz: TimeZone>(
    records: &[IntakeRecord],
    profile: Option<&UserProfile>,
    now: &DateTime<Tz>,
) -> CaffeineReport {
    let now_utc = now.with_timezone(&Utc);
    let default_profile = UserProfile::default();
    let effective_profile = profile.unwrap_or(&default_profile);

    let residual_mg = total_residual_at(records, now_utc);
    let latest_intake_at = latest_intake_instant(records);
    let status = classify(records, now_utc, residual_mg, latest_intake_at, profile);

    let bedtime_at = bedtime_reference_instant(effective_profile, now).with_timezone(&Utc);
    let bedtime_residual_mg = total_residual_at(records, bedtime_at);

    tracing::debug!(
        "Evaluated {} records: {:.1} mg, state {:?}",
        records.len(),
        residual_mg,
        status.state
    );

    CaffeineReport {
        evaluated_at: now_utc,
        residual_mg,
        status,
        today_total_mg: today_total_mg(records, now),
        latest_intake_at,
        bedtime_at,
        bedtime_residual_mg,
        latest_intake_mg_per_kg: latest_intake_mg_per_kg(records, effective_profile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{CaffeineState, WarningLevel};
    use crate::SensitivityLevel;
    use chrono::{Duration, NaiveTime};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 24, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_evaluate_empty() {
        crate::logging::init_test();
        let report = evaluate(&[], None, &t0());

        assert_eq!(report.residual_mg, 0.0);
        assert_eq!(report.status.state, CaffeineState::NoRecentIntake);
        assert_eq!(report.today_total_mg, 0.0);
        assert_eq!(report.latest_intake_at, None);
        assert_eq!(report.bedtime_residual_mg, 0.0);
        assert_eq!(report.latest_intake_mg_per_kg, None);
        assert_eq!(
            report.bedtime_at,
            Utc.with_ymd_and_hms(2026, 2, 24, 23, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_evaluate_five_hours_after_single_intake() {
        let records = vec![IntakeRecord::new(100.0, t0())];
        let now = t0() + Duration::hours(5);

        let report = evaluate(&records, None, &now);

        assert!((report.residual_mg - 50.0).abs() < 1e-9);
        assert_eq!(report.status.state, CaffeineState::Declining);
        assert_eq!(report.today_total_mg, 100.0);
        assert_eq!(report.latest_intake_at, Some(t0()));
    }

    #[test]
    fn test_evaluate_with_profile() {
        let records = vec![
            IntakeRecord::new(80.0, t0()),
            IntakeRecord::new(80.0, t0() + Duration::hours(1)),
        ];
        let profile = UserProfile {
            weight_value: Some(80.0),
            bedtime: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            sensitivity_level: SensitivityLevel::High,
            ..UserProfile::default()
        };
        let now = t0() + Duration::hours(2);

        let report = evaluate(&records, Some(&profile), &now);

        assert_eq!(report.status.state, CaffeineState::PeakWindow);
        assert_eq!(report.status.warning_level, WarningLevel::High);
        assert_eq!(report.latest_intake_mg_per_kg, Some(1.0));
        assert_eq!(
            report.bedtime_at,
            Utc.with_ymd_and_hms(2026, 2, 24, 20, 0, 0).unwrap()
        );

        let expected_bedtime =
            80.0 * 0.5_f64.powf(11.0 / 5.0) + 80.0 * 0.5_f64.powf(10.0 / 5.0);
        assert!((report.bedtime_residual_mg - expected_bedtime).abs() < 1e-9);
    }

    #[test]
    fn test_report_serializes() {
        let records = vec![IntakeRecord::new(96.0, t0())];
        let report = evaluate(&records, None, &(t0() + Duration::minutes(30)));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"]["state"], "rising");
        assert_eq!(json["status"]["warning_level"], "mild");
        assert!(json["latest_intake_mg_per_kg"].is_null());
    }
}
