use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlarmError {
    #[error("hour {0} is out of range 0..=23")]
    InvalidHour(u32),
    #[error("minute {0} is out of range 0..=59")]
    InvalidMinute(u32),
    #[error("weekday code {0} is out of range 1..=7 (Sunday = 1)")]
    InvalidWeekday(u8),
    #[error("unknown weekday name {0:?}")]
    InvalidWeekdayName(String),
    #[error("weekday mask {0:#04x} has bits above Saturday set")]
    InvalidWeekdayBits(u8),
    #[error("local wall-clock time cannot be represented in this timezone")]
    NonexistentLocalTime,
    #[error("date arithmetic left the supported calendar range")]
    DateOutOfRange,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error while reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid [matching] policy: {0}")]
    Matching(String),
    #[error("alarm #{index} is invalid: {source}")]
    Alarm {
        index: usize,
        #[source]
        source: AlarmError,
    },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
