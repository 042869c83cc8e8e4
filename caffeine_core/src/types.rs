//! Core domain types for the caffeine tracker.
//!
//! This module defines the persisted shapes the engine consumes:
//! - Intake records (what was consumed, and when)
//! - The user profile (weight, bedtime, sensitivity)

use crate::{Error, Result};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Single-compartment elimination half-life used by the decay model
pub const HALF_LIFE_HOURS: f64 = 5.0;

/// Residual level below which the classifier reports a low residual
pub const LOW_RESIDUAL_THRESHOLD_MG: f64 = 15.0;

/// Exact conversion factor from pounds to kilograms
pub const KG_PER_POUND: f64 = 0.45359237;

// ============================================================================
// Intake Records
// ============================================================================

/// A logged caffeine intake
///
/// Records are immutable once created; the only mutation the store offers
/// is deletion.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRecord {
    pub id: Uuid,
    pub caffeine_mg: f64,
    pub consumed_at: DateTime<Utc>,
}

impl IntakeRecord {
    /// Create a record with a fresh id
    ///
    /// No validation happens here; see [`crate::input::new_intake`] for the
    /// checked entry point.
    pub fn new(caffeine_mg: f64, consumed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            caffeine_mg,
            consumed_at,
        }
    }
}

// ============================================================================
// Profile Types
// ============================================================================

/// Unit the body weight was entered in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl WeightUnit {
    /// Convert a weight in this unit to kilograms
    pub fn to_kg(self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lb => value * KG_PER_POUND,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }
}

impl FromStr for WeightUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kg" => Ok(WeightUnit::Kg),
            "lb" | "lbs" => Ok(WeightUnit::Lb),
            other => Err(Error::InvalidInput(format!(
                "unknown weight unit '{}' (expected kg or lb)",
                other
            ))),
        }
    }
}

/// Unit the height was entered in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    #[default]
    Cm,
}

/// Self-reported caffeine sensitivity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SensitivityLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl SensitivityLevel {
    pub fn display_name(self) -> &'static str {
        match self {
            SensitivityLevel::Low => "Low",
            SensitivityLevel::Medium => "Medium",
            SensitivityLevel::High => "High",
        }
    }
}

impl FromStr for SensitivityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(SensitivityLevel::Low),
            "medium" => Ok(SensitivityLevel::Medium),
            "high" => Ok(SensitivityLevel::High),
            other => Err(Error::InvalidInput(format!(
                "unknown sensitivity '{}' (expected low, medium or high)",
                other
            ))),
        }
    }
}

impl fmt::Display for SensitivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The single user profile
///
/// Unknown or missing fields in the stored form fall back to defaults, so an
/// older or hand-edited `profile.json` still loads.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub weight_value: Option<f64>,
    pub weight_unit: WeightUnit,
    pub height_value: Option<f64>,
    pub height_unit: HeightUnit,
    pub bedtime: NaiveTime,
    pub sensitivity_level: SensitivityLevel,
    pub use_weight_based_hints: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            weight_value: None,
            weight_unit: WeightUnit::Kg,
            height_value: None,
            height_unit: HeightUnit::Cm,
            bedtime: default_bedtime(),
            sensitivity_level: SensitivityLevel::Medium,
            use_weight_based_hints: true,
        }
    }
}

impl UserProfile {
    /// Body weight in kilograms, if a usable weight is set
    pub fn weight_kg(&self) -> Option<f64> {
        self.weight_value
            .filter(|w| w.is_finite() && *w > 0.0)
            .map(|w| self.weight_unit.to_kg(w))
    }

    pub fn is_high_sensitivity(&self) -> bool {
        self.sensitivity_level == SensitivityLevel::High
    }
}

fn default_bedtime() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 30, 0).expect("23:30:00 is a valid time of day")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_profile() {
        let profile = UserProfile::default();
        assert_eq!(profile.weight_value, None);
        assert_eq!(profile.height_value, None);
        assert_eq!(profile.bedtime, NaiveTime::from_hms_opt(23, 30, 0).unwrap());
        assert_eq!(profile.sensitivity_level, SensitivityLevel::Medium);
        assert!(profile.use_weight_based_hints);
    }

    #[test]
    fn test_record_persisted_field_names() {
        let record = IntakeRecord {
            id: Uuid::nil(),
            caffeine_mg: 96.0,
            consumed_at: Utc.with_ymd_and_hms(2026, 2, 24, 8, 30, 0).unwrap(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["caffeineMg"], 96.0);
        assert_eq!(json["consumedAt"], "2026-02-24T08:30:00Z");
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_profile_persisted_field_names() {
        let json = serde_json::to_value(UserProfile::default()).unwrap();
        assert!(json["weightValue"].is_null());
        assert_eq!(json["weightUnit"], "kg");
        assert_eq!(json["heightUnit"], "cm");
        assert_eq!(json["bedtime"], "23:30:00");
        assert_eq!(json["sensitivityLevel"], "medium");
        assert_eq!(json["useWeightBasedHints"], true);
    }

    #[test]
    fn test_partial_profile_fills_defaults() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"sensitivityLevel":"high","weightValue":150}"#).unwrap();
        assert_eq!(profile.sensitivity_level, SensitivityLevel::High);
        assert_eq!(profile.weight_value, Some(150.0));
        assert_eq!(profile.weight_unit, WeightUnit::Kg);
        assert_eq!(profile.bedtime, default_bedtime());
    }

    #[test]
    fn test_weight_kg_conversion() {
        let mut profile = UserProfile {
            weight_value: Some(100.0),
            weight_unit: WeightUnit::Lb,
            ..UserProfile::default()
        };
        assert!((profile.weight_kg().unwrap() - 45.359237).abs() < 1e-9);

        profile.weight_unit = WeightUnit::Kg;
        assert_eq!(profile.weight_kg(), Some(100.0));

        profile.weight_value = Some(0.0);
        assert_eq!(profile.weight_kg(), None);
    }

    #[test]
    fn test_parse_units_and_levels() {
        assert_eq!("LB".parse::<WeightUnit>().unwrap(), WeightUnit::Lb);
        assert_eq!("kg".parse::<WeightUnit>().unwrap(), WeightUnit::Kg);
        assert!("stone".parse::<WeightUnit>().is_err());

        assert_eq!(
            " High ".parse::<SensitivityLevel>().unwrap(),
            SensitivityLevel::High
        );
        assert!("extreme".parse::<SensitivityLevel>().is_err());
    }
}
