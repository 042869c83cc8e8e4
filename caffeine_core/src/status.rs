//! Caffeine state classification.
//!
//! The state is recomputed from scratch on every call; there is no transition
//! history. Rules are evaluated in order and the first match wins:
//!
//! 1. **No records** → no recent intake
//! 2. **Residual < 15 mg** → low residual
//! 3. **No known intake time** → declining
//! 4. **Minutes since latest intake**:
//!    - ≤ 15 (or negative) → absorbing
//!    - ≤ 45 → rising
//!    - ≤ 120 → peak window
//!    - otherwise → declining

use crate::{IntakeRecord, UserProfile, LOW_RESIDUAL_THRESHOLD_MG};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ABSORBING_WINDOW_MINUTES: f64 = 15.0;
const RISING_WINDOW_MINUTES: f64 = 45.0;
const PEAK_WINDOW_MINUTES: f64 = 120.0;

const HIGH_SENSITIVITY_SUFFIX: &str = " May affect sleep more if your sensitivity is high.";

/// Estimated physiological state
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CaffeineState {
    NoRecentIntake,
    Absorbing,
    Rising,
    PeakWindow,
    Declining,
    LowResidual,
}

impl CaffeineState {
    pub fn badge_title(self) -> &'static str {
        match self {
            CaffeineState::NoRecentIntake => "No Recent Intake",
            CaffeineState::Absorbing => "Absorbing",
            CaffeineState::Rising => "Rising",
            CaffeineState::PeakWindow => "Peak Window",
            CaffeineState::Declining => "Declining",
            CaffeineState::LowResidual => "Low Residual",
        }
    }

    /// Whether high sensitivity changes the wording and warning of this state
    fn is_sensitivity_relevant(self) -> bool {
        !matches!(
            self,
            CaffeineState::NoRecentIntake | CaffeineState::LowResidual
        )
    }
}

/// Advisory severity attached to a state
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    None,
    Mild,
    Moderate,
    High,
}

/// Descriptive status derived for one evaluation instant
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaffeineStatusSnapshot {
    pub state: CaffeineState,
    pub headline: String,
    pub supporting_text: String,
    pub warning_level: WarningLevel,
}

/// Classify the current caffeine state
///
/// Total over all inputs: a missing profile counts as non-high sensitivity,
/// and any residual (including negative or NaN) maps to some state.
pub fn classify(
    records: &[IntakeRecord],
    now: DateTime<Utc>,
    current_residual_mg: f64,
    latest_intake: Option<DateTime<Utc>>,
    profile: Option<&UserProfile>,
) -> CaffeineStatusSnapshot {
    let high = profile.is_some_and(UserProfile::is_high_sensitivity);

    if records.is_empty() {
        return snapshot(
            CaffeineState::NoRecentIntake,
            "Estimated state: No recent intake",
            "Reference estimate based on your logged intakes.",
            high,
        );
    }

    if current_residual_mg < LOW_RESIDUAL_THRESHOLD_MG {
        return snapshot(
            CaffeineState::LowResidual,
            "Estimated state: Low residual",
            "Reference estimate suggests low remaining caffeine.",
            high,
        );
    }

    let Some(latest) = latest_intake else {
        return snapshot(
            CaffeineState::Declining,
            "Estimated state: Declining",
            "Estimated from residual level and intake history.",
            high,
        );
    };

    let elapsed_minutes = (now - latest).num_milliseconds() as f64 / 60_000.0;
    let state = state_for_elapsed(elapsed_minutes);

    let headline = format!("Estimated state: {}", state.badge_title());
    snapshot(state, &headline, supporting_text(state), high)
}

/// Timing band for minutes since the latest intake
fn state_for_elapsed(elapsed_minutes: f64) -> CaffeineState {
    if elapsed_minutes < 0.0 || elapsed_minutes <= ABSORBING_WINDOW_MINUTES {
        CaffeineState::Absorbing
    } else if elapsed_minutes <= RISING_WINDOW_MINUTES {
        CaffeineState::Rising
    } else if elapsed_minutes <= PEAK_WINDOW_MINUTES {
        CaffeineState::PeakWindow
    } else {
        CaffeineState::Declining
    }
}

fn supporting_text(state: CaffeineState) -> &'static str {
    match state {
        CaffeineState::NoRecentIntake => "Reference estimate based on your logged intakes.",
        CaffeineState::Absorbing => {
            "Estimated from latest intake timing; effects may still be building."
        }
        CaffeineState::Rising => {
            "Estimated from latest intake timing; caffeine level may still be rising."
        }
        CaffeineState::PeakWindow => {
            "Estimated from latest intake timing; this may be near the peak window."
        }
        CaffeineState::Declining => {
            "Estimated from latest intake timing and half-life reference; levels may be declining."
        }
        CaffeineState::LowResidual => "Reference estimate suggests low remaining caffeine.",
    }
}

/// Warning level for a state, modulated by sensitivity
pub fn warning_level(state: CaffeineState, high_sensitivity: bool) -> WarningLevel {
    match state {
        CaffeineState::NoRecentIntake | CaffeineState::LowResidual => WarningLevel::None,
        CaffeineState::Absorbing | CaffeineState::Rising => {
            if high_sensitivity {
                WarningLevel::Moderate
            } else {
                WarningLevel::Mild
            }
        }
        CaffeineState::PeakWindow => {
            if high_sensitivity {
                WarningLevel::High
            } else {
                WarningLevel::Moderate
            }
        }
        CaffeineState::Declining => {
            if high_sensitivity {
                WarningLevel::Mild
            } else {
                WarningLevel::None
            }
        }
    }
}

fn snapshot(
    state: CaffeineState,
    headline: &str,
    supporting: &str,
    high_sensitivity: bool,
) -> CaffeineStatusSnapshot {
    let mut supporting_text = supporting.to_string();
    if high_sensitivity && state.is_sensitivity_relevant() {
        supporting_text.push_str(HIGH_SENSITIVITY_SUFFIX);
    }

    CaffeineStatusSnapshot {
        state,
        headline: headline.to_string(),
        supporting_text,
        warning_level: warning_level(state, high_sensitivity),
    }
}
