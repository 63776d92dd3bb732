use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use chrono::FixedOffset;

use crate::alarm::Alarm;
use crate::error::ConfigError;
use crate::matcher::MatchPolicy;

pub const DEFAULT_CONFIG_PATH: &str = "sayit.toml";

// ============================================================================
// Top-level Config
// ============================================================================

/// `[matching]` is a [`MatchPolicy`]; `[[alarms]]` entries are [`Alarm`]s.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub matching: MatchPolicy,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub alarms: Vec<Alarm>,
}

// ============================================================================
// Clock Config
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ClockConfig {
    /// Fixed UTC offset for "now"; system local zone when unset
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

impl ClockConfig {
    pub fn fixed_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .and_then(|minutes| minutes.checked_mul(60))
            .and_then(FixedOffset::east_opt)
    }
}

// ============================================================================
// Loading and validation
// ============================================================================

impl Config {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|e| ConfigError::parse(path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file. A missing file is an error here.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config = Self::from_toml(&text, path)?;
        info!(path = %path.display(), alarms = config.alarms.len(), "loaded config");
        Ok(config)
    }

    /// Like [`Config::load_from`] but falls back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from(path)
        } else {
            warn!(path = %path.display(), "config not found, using defaults");
            Ok(Config::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.matching.max_error_ratio;
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(ConfigError::Matching(format!(
                "max_error_ratio must be a non-negative number, got {}",
                ratio
            )));
        }
        if self.clock.utc_offset_minutes.is_some() && self.clock.fixed_offset().is_none() {
            warn!(
                minutes = ?self.clock.utc_offset_minutes,
                "utc_offset_minutes out of range, using local time"
            );
        }
        for (index, alarm) in self.alarms.iter().enumerate() {
            alarm
                .validate()
                .map_err(|source| ConfigError::Alarm { index, source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AlarmError;
    use crate::repeat::WeeklyRepeat;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("", Path::new("sayit.toml")).unwrap();
        assert_eq!(config.matching, MatchPolicy::default());
        assert!(config.alarms.is_empty());
        assert_eq!(config.clock.fixed_offset(), None);
    }

    #[test]
    fn test_full_config() {
        let text = r#"
            [matching]
            max_error_ratio = 0.2
            max_allowed = 3

            [clock]
            utc_offset_minutes = 60

            [[alarms]]
            hour = 7
            minute = 0
            repeat = "sun"
            label = "Weekend"
            scripts = ["Slow mornings are earned"]

            [[alarms]]
            hour = 6
            minute = 30
            enabled = false
        "#;
        let config = Config::from_toml(text, Path::new("sayit.toml")).unwrap();
        assert_eq!(config.matching.max_error_ratio, 0.2);
        assert_eq!(config.matching.min_allowed, 1);
        assert_eq!(config.matching.max_allowed, Some(3));
        assert_eq!(config.clock.fixed_offset(), FixedOffset::east_opt(3600));
        assert_eq!(config.alarms.len(), 2);
        assert_eq!(config.alarms[0].repeat, WeeklyRepeat::from_codes(&[1]).unwrap());
        assert!(config.alarms[1].is_one_shot());
        assert!(!config.alarms[1].enabled);
    }

    #[test]
    fn test_invalid_alarm() {
        let text = r#"
            [[alarms]]
            hour = 7
            minute = 0

            [[alarms]]
            hour = 24
            minute = 0
        "#;
        let err = Config::from_toml(text, Path::new("sayit.toml")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Alarm {
                index: 1,
                source: AlarmError::InvalidHour(24)
            }
        ));
    }

    #[test]
    fn test_bad_repeat_is_parse_error() {
        let text = r#"
            [[alarms]]
            hour = 7
            minute = 0
            repeat = "someday"
        "#;
        let err = Config::from_toml(text, Path::new("sayit.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_local() {
        for minutes in [40_000_000, i32::MIN, 24 * 60] {
            let text = format!("[clock]\nutc_offset_minutes = {}\n", minutes);
            let config = Config::from_toml(&text, Path::new("sayit.toml")).unwrap();
            assert_eq!(config.clock.fixed_offset(), None);
        }
        let config =
            Config::from_toml("[clock]\nutc_offset_minutes = -330\n", Path::new("sayit.toml"))
                .unwrap();
        assert_eq!(config.clock.fixed_offset(), FixedOffset::west_opt(330 * 60));
    }

    #[test]
    fn test_bad_error_ratio() {
        for ratio in ["-0.1", "nan", "inf"] {
            let text = format!("[matching]\nmax_error_ratio = {}\n", ratio);
            let err = Config::from_toml(&text, Path::new("sayit.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::Matching(_)), "{ratio}");
        }
        let config =
            Config::from_toml("[matching]\nmax_error_ratio = 0.0\n", Path::new("sayit.toml"));
        assert!(config.is_ok());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = Path::new("definitely/not/here/sayit.toml");
        assert!(Config::load(path).unwrap().alarms.is_empty());
        assert!(matches!(Config::load_from(path), Err(ConfigError::Io { .. })));
    }
}
