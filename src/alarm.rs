use chrono::{DateTime, TimeZone};
use serde::Deserialize;

use crate::error::AlarmError;
use crate::repeat::WeeklyRepeat;
use crate::schedule::{fire_time, next_alarm_time};

/// An alarm as the repository layer hands it to the core.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Alarm {
    pub hour: u32,
    pub minute: u32,
    #[serde(default)]
    pub repeat: WeeklyRepeat,
    /// Scripts the user must read aloud, in order
    #[serde(default)]
    pub scripts: Vec<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Alarm {
    pub fn new(
        hour: u32,
        minute: u32,
        repeat: WeeklyRepeat,
        scripts: Vec<String>,
    ) -> Result<Self, AlarmError> {
        let alarm = Self {
            hour,
            minute,
            repeat,
            scripts,
            label: None,
            enabled: true,
        };
        alarm.validate()?;
        Ok(alarm)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Check hour and minute ranges. Weekdays are valid by construction.
    pub fn validate(&self) -> Result<(), AlarmError> {
        fire_time(self.hour, self.minute).map(|_| ())
    }

    pub fn is_one_shot(&self) -> bool {
        self.repeat.is_empty()
    }

    pub fn next_fire<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<DateTime<Tz>, AlarmError> {
        next_alarm_time(now, self.hour, self.minute, &self.repeat)
    }

    /// `HH:MM` plus label when present.
    pub fn title(&self) -> String {
        match &self.label {
            Some(label) => format!("{:02}:{:02} {}", self.hour, self.minute, label),
            None => format!("{:02}:{:02}", self.hour, self.minute),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_new_validates() {
        assert!(Alarm::new(7, 30, WeeklyRepeat::once(), vec![]).is_ok());
        assert_eq!(
            Alarm::new(25, 0, WeeklyRepeat::once(), vec![]),
            Err(AlarmError::InvalidHour(25))
        );
        assert_eq!(
            Alarm::new(7, 75, WeeklyRepeat::once(), vec![]),
            Err(AlarmError::InvalidMinute(75))
        );
    }

    #[test]
    fn test_next_fire() {
        let alarm = Alarm::new(8, 0, "mon,wed,fri".parse().unwrap(), vec![]).unwrap();
        assert!(!alarm.is_one_shot());
        let now = Utc.with_ymd_and_hms(2024, 2, 20, 16, 14, 0).unwrap();
        assert_eq!(
            alarm.next_fire(&now).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 21, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_title() {
        let alarm = Alarm::new(6, 5, WeeklyRepeat::once(), vec![]).unwrap();
        assert_eq!(alarm.title(), "06:05");
        assert_eq!(alarm.with_label("Gym").title(), "06:05 Gym");
    }

    #[test]
    fn test_deserialize() {
        let alarm: Alarm = toml::from_str(
            r#"
            hour = 6
            minute = 45
            repeat = "weekdays"
            scripts = ["I am awake", "Today is a good day"]
            "#,
        )
        .unwrap();
        assert_eq!(alarm.repeat, WeeklyRepeat::weekdays());
        assert_eq!(alarm.scripts.len(), 2);
        assert!(alarm.enabled);
        assert_eq!(alarm.label, None);
    }
}
