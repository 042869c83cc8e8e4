//! Residual timeline sampling for charts and text plots.

use crate::aggregate::total_residual_at;
use crate::IntakeRecord;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// One sample of the residual curve
///
/// A point's identity is its timestamp; markers that land on the same
/// instant share one point.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TimelinePoint {
    pub time: DateTime<Utc>,
    pub estimated_residual_mg: f64,
    pub is_now_marker: bool,
    pub is_bedtime_marker: bool,
}

/// Span and resolution of a timeline
#[derive(Clone, Copy, Debug)]
pub struct TimelineWindow {
    pub lookback: Duration,
    pub horizon: Duration,
    pub step: Duration,
}

impl Default for TimelineWindow {
    fn default() -> Self {
        Self {
            lookback: Duration::hours(6),
            horizon: Duration::hours(12),
            step: Duration::minutes(30),
        }
    }
}

/// Sample the residual curve around `now`
///
/// The curve runs from `now - lookback` to whichever is later of
/// `now + horizon` and `bedtime`. Exact points for `now` and `bedtime` are
/// always present, flagged as markers. A non-positive step yields only the
/// marker points.
pub fn build_timeline(
    records: &[IntakeRecord],
    now: DateTime<Utc>,
    bedtime: Option<DateTime<Utc>>,
    window: &TimelineWindow,
) -> Vec<TimelinePoint> {
    let mut points: BTreeMap<DateTime<Utc>, TimelinePoint> = BTreeMap::new();

    let start = now - window.lookback;
    let end = match bedtime {
        Some(b) if b > now + window.horizon => b,
        _ => now + window.horizon,
    };

    if window.step > Duration::zero() {
        let mut t = start;
        while t <= end {
            points.insert(t, sample(records, t));
            t += window.step;
        }
    } else {
        tracing::debug!("Timeline step {:?} is not positive, emitting markers only", window.step);
    }

    points
        .entry(now)
        .or_insert_with(|| sample(records, now))
        .is_now_marker = true;

    if let Some(b) = bedtime {
        points
            .entry(b)
            .or_insert_with(|| sample(records, b))
            .is_bedtime_marker = true;
    }

    points.into_values().collect()
}

fn sample(records: &[IntakeRecord], time: DateTime<Utc>) -> TimelinePoint {
    TimelinePoint {
        time,
        estimated_residual_mg: total_residual_at(records, time),
        is_now_marker: false,
        is_bedtime_marker: false,
    }
}
