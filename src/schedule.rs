//! Next fire time for one-shot and weekly-repeating alarms
//!
//! All functions take "now" from the caller and never read the clock.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeDelta, TimeZone};

use crate::error::AlarmError;
use crate::repeat::{WeeklyRepeat, weekday_code};

/// Earliest instant strictly after `now` at `hour:minute:00.000` that falls
/// on a day in `repeat` (any day when `repeat` is empty).
///
/// A fire time equal to `now` counts as already past and rolls forward.
pub fn next_alarm_time<Tz: TimeZone>(
    now: &DateTime<Tz>,
    hour: u32,
    minute: u32,
    repeat: &WeeklyRepeat,
) -> Result<DateTime<Tz>, AlarmError> {
    let time = fire_time(hour, minute)?;
    let tz = now.timezone();

    let mut date = now.date_naive();
    let mut candidate = localize(&tz, date, time)?;
    if candidate <= *now {
        date = add_days(date, 1)?;
        candidate = localize(&tz, date, time)?;
    }

    let today = weekday_code(date.weekday());
    if let Some(target) = repeat.next_on_or_after(today) {
        let ahead = (target + 7 - today) % 7;
        if ahead > 0 {
            date = add_days(date, u64::from(ahead))?;
            candidate = localize(&tz, date, time)?;
        }
        if candidate <= *now {
            date = add_days(date, 7)?;
            candidate = localize(&tz, date, time)?;
        }
    }

    Ok(candidate)
}

/// Same as [`next_alarm_time`] but takes raw Sunday = 1 weekday codes.
pub fn next_alarm_time_from_codes<Tz: TimeZone>(
    now: &DateTime<Tz>,
    hour: u32,
    minute: u32,
    codes: &[u8],
) -> Result<DateTime<Tz>, AlarmError> {
    let repeat = WeeklyRepeat::from_codes(codes)?;
    next_alarm_time(now, hour, minute, &repeat)
}

pub(crate) fn fire_time(hour: u32, minute: u32) -> Result<NaiveTime, AlarmError> {
    if hour > 23 {
        return Err(AlarmError::InvalidHour(hour));
    }
    if minute > 59 {
        return Err(AlarmError::InvalidMinute(minute));
    }
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or(AlarmError::InvalidHour(hour))
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate, AlarmError> {
    date.checked_add_days(Days::new(days))
        .ok_or(AlarmError::DateOutOfRange)
}

// Ambiguous local times (DST fall-back) take the earlier instant. Times inside
// a spring-forward gap are pushed one hour later.
fn localize<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<DateTime<Tz>, AlarmError> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            naive
                .checked_add_signed(TimeDelta::hours(1))
                .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
        })
        .ok_or(AlarmError::NonexistentLocalTime)
}

/// Time remaining from `now` until `fire`. Negative if `fire` is in the past.
pub fn time_until<Tz: TimeZone>(now: &DateTime<Tz>, fire: &DateTime<Tz>) -> TimeDelta {
    fire.clone() - now.clone()
}

/// Human text for a countdown, e.g. `"1 day 3 hours 5 minutes"`.
///
/// Partial minutes round up so the text never undersells the wait.
pub fn describe_time_until(remaining: TimeDelta) -> String {
    let secs = remaining.num_seconds();
    if secs <= 0 {
        return "now".to_string();
    }
    if secs < 60 {
        return "less than a minute".to_string();
    }

    let total_minutes = (secs + 59) / 60;
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;

    let mut parts = Vec::new();
    for (value, unit) in [(days, "day"), (hours, "hour"), (minutes, "minute")] {
        match value {
            0 => {}
            1 => parts.push(format!("1 {}", unit)),
            n => parts.push(format!("{} {}s", n, unit)),
        }
    }
    parts.join(" ")
}
