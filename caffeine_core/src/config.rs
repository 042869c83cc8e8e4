//! Configuration file support for the caffeine tracker.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/caffeine-tracker/config.toml`.

use crate::timeline::TimelineWindow;
use crate::{Error, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "caffeine-tracker";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub timeline: TimelineConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl DataConfig {
    pub fn records_path(&self) -> PathBuf {
        records_path_in(&self.data_dir)
    }

    pub fn profile_path(&self) -> PathBuf {
        profile_path_in(&self.data_dir)
    }
}

/// Path of the records file inside a data directory
pub fn records_path_in(data_dir: &Path) -> PathBuf {
    data_dir.join("records.json")
}

/// Path of the profile file inside a data directory
pub fn profile_path_in(data_dir: &Path) -> PathBuf {
    data_dir.join("profile.json")
}

/// Timeline sampling configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_step_minutes")]
    pub step_minutes: i64,

    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: i64,

    #[serde(default = "default_horizon_hours")]
    pub horizon_hours: i64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            step_minutes: default_step_minutes(),
            lookback_hours: default_lookback_hours(),
            horizon_hours: default_horizon_hours(),
        }
    }
}

impl TimelineConfig {
    pub fn window(&self) -> TimelineWindow {
        TimelineWindow {
            lookback: Duration::hours(self.lookback_hours.clamp(0, MAX_WINDOW_HOURS)),
            horizon: Duration::hours(self.horizon_hours.clamp(0, MAX_WINDOW_HOURS)),
            step: Duration::minutes(self.step_minutes.min(MAX_STEP_MINUTES)),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join(APP_DIR)
}

/// Longest lookback or horizon the timeline accepts (one week)
pub const MAX_WINDOW_HOURS: i64 = 7 * 24;

/// Coarsest sampling step the timeline accepts (one day)
pub const MAX_STEP_MINUTES: i64 = 24 * 60;

fn default_step_minutes() -> i64 {
    30
}

fn default_lookback_hours() -> i64 {
    6
}

fn default_horizon_hours() -> i64 {
    12
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join(APP_DIR).join("config.toml")
    }

    /// Reject settings the timeline cannot use
    pub fn validate(&self) -> Result<()> {
        let timeline = &self.timeline;
        if !(1..=MAX_STEP_MINUTES).contains(&timeline.step_minutes) {
            return Err(Error::Config(format!(
                "timeline.step_minutes must be between 1 and {}, got {}",
                MAX_STEP_MINUTES, timeline.step_minutes
            )));
        }
        for (name, hours) in [
            ("lookback_hours", timeline.lookback_hours),
            ("horizon_hours", timeline.horizon_hours),
        ] {
            if !(0..=MAX_WINDOW_HOURS).contains(&hours) {
                return Err(Error::Config(format!(
                    "timeline.{} must be between 0 and {}, got {}",
                    name, MAX_WINDOW_HOURS, hours
                )));
            }
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.data.data_dir.ends_with(APP_DIR));
        assert_eq!(config.timeline.step_minutes, 30);
        assert_eq!(config.timeline.lookback_hours, 6);
        assert_eq!(config.timeline.horizon_hours, 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.timeline.step_minutes = 15;
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.timeline.step_minutes, 15);
        assert_eq!(parsed.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[timeline]
horizon_hours = 18
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.timeline.horizon_hours, 18);
        assert_eq!(config.timeline.step_minutes, 30); // default
    }

    #[test]
    fn test_invalid_step_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[timeline]\nstep_minutes = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_window_from_config() {
        let window = TimelineConfig::default().window();
        assert_eq!(window.step, Duration::minutes(30));
        assert_eq!(window.lookback, Duration::hours(6));
        assert_eq!(window.horizon, Duration::hours(12));
    }

    #[test]
    fn test_data_paths() {
        let data = DataConfig {
            data_dir: PathBuf::from("/tmp/caff"),
        };
        assert_eq!(data.records_path(), PathBuf::from("/tmp/caff/records.json"));
        assert_eq!(data.profile_path(), PathBuf::from("/tmp/caff/profile.json"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_timeline() {
        let mut config = Config::default();
        config.timeline.lookback_hours = 10_000_000_000_000;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.timeline.horizon_hours = MAX_WINDOW_HOURS + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.timeline.step_minutes = MAX_STEP_MINUTES + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.timeline.lookback_hours = MAX_WINDOW_HOURS;
        config.timeline.horizon_hours = MAX_WINDOW_HOURS;
        config.timeline.step_minutes = MAX_STEP_MINUTES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_window_clamps_unvalidated_values() {
        let timeline = TimelineConfig {
            step_minutes: i64::MAX,
            lookback_hours: i64::MAX,
            horizon_hours: -5,
        };
        let window = timeline.window();
        assert_eq!(window.lookback, Duration::hours(MAX_WINDOW_HOURS));
        assert_eq!(window.horizon, Duration::zero());
        assert_eq!(window.step, Duration::minutes(MAX_STEP_MINUTES));
    }

    #[test]
    fn test_load_from_rejects_huge_lookback() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[timeline]\nlookback_hours = 10000000000000\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
