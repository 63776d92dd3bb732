//! Say It Alarm core
//!
//! Portable logic behind an alarm clock that is dismissed by reading a
//! script aloud:
//! - [`schedule`] computes when an alarm fires next
//! - [`fuzzy`] measures how far a transcript is from the script
//! - [`matcher`] decides whether that distance is close enough
//! - [`dismissal`] walks a ringing alarm through its scripts

pub mod alarm;
pub mod config;
pub mod dismissal;
pub mod error;
pub mod fuzzy;
pub mod matcher;
pub mod repeat;
pub mod schedule;

pub use alarm::Alarm;
pub use dismissal::{Dismissal, DismissalEvent, TranscriptEvent};
pub use error::{AlarmError, ConfigError};
pub use fuzzy::edit_distance;
pub use matcher::{MatchPolicy, MatchResult};
pub use repeat::WeeklyRepeat;
pub use schedule::next_alarm_time;
