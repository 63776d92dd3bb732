//! Weekly repeat sets
//!
//! Weekday codes follow the calendar convention Sunday = 1 through
//! Saturday = 7. The packed form stores code `c` at bit `c - 1`.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::Deserialize;

use crate::error::AlarmError;

pub const SUNDAY: u8 = 1;
pub const MONDAY: u8 = 2;
pub const TUESDAY: u8 = 3;
pub const WEDNESDAY: u8 = 4;
pub const THURSDAY: u8 = 5;
pub const FRIDAY: u8 = 6;
pub const SATURDAY: u8 = 7;

const ALL_BITS: u8 = 0b0111_1111;
const SHORT_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Set of weekdays on which an alarm fires. Empty means one-shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub struct WeeklyRepeat {
    bits: u8,
}

impl WeeklyRepeat {
    pub const fn once() -> Self {
        Self { bits: 0 }
    }

    pub const fn daily() -> Self {
        Self { bits: ALL_BITS }
    }

    pub const fn weekdays() -> Self {
        // Mon..Fri = codes 2..=6
        Self { bits: 0b0011_1110 }
    }

    pub const fn weekends() -> Self {
        Self { bits: 0b0100_0001 }
    }

    /// Build from raw weekday codes. Duplicates collapse.
    pub fn from_codes(codes: &[u8]) -> Result<Self, AlarmError> {
        let mut repeat = Self::once();
        for &code in codes {
            repeat.insert(code)?;
        }
        Ok(repeat)
    }

    pub fn from_bits(bits: u8) -> Result<Self, AlarmError> {
        if bits & !ALL_BITS != 0 {
            return Err(AlarmError::InvalidWeekdayBits(bits));
        }
        Ok(Self { bits })
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn insert(&mut self, code: u8) -> Result<(), AlarmError> {
        check_code(code)?;
        self.bits |= 1 << (code - 1);
        Ok(())
    }

    pub fn contains(&self, code: u8) -> bool {
        (1..=7).contains(&code) && self.bits & (1 << (code - 1)) != 0
    }

    pub fn contains_weekday(&self, day: Weekday) -> bool {
        self.contains(weekday_code(day))
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Member codes in ascending order.
    pub fn codes(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=7u8).filter(|&code| self.contains(code))
    }

    /// Smallest member `>= code`, wrapping around to the smallest member.
    /// `None` only for an empty set.
    pub fn next_on_or_after(&self, code: u8) -> Option<u8> {
        self.codes()
            .find(|&c| c >= code)
            .or_else(|| self.codes().next())
    }
}

fn check_code(code: u8) -> Result<(), AlarmError> {
    if (1..=7).contains(&code) {
        Ok(())
    } else {
        Err(AlarmError::InvalidWeekday(code))
    }
}

/// Sunday = 1 .. Saturday = 7
pub fn weekday_code(day: Weekday) -> u8 {
    day.number_from_sunday() as u8
}

pub fn weekday_from_code(code: u8) -> Result<Weekday, AlarmError> {
    let day = match code {
        SUNDAY => Weekday::Sun,
        MONDAY => Weekday::Mon,
        TUESDAY => Weekday::Tue,
        WEDNESDAY => Weekday::Wed,
        THURSDAY => Weekday::Thu,
        FRIDAY => Weekday::Fri,
        SATURDAY => Weekday::Sat,
        other => return Err(AlarmError::InvalidWeekday(other)),
    };
    Ok(day)
}

fn parse_token(token: &str) -> Result<WeeklyRepeat, AlarmError> {
    let code = match token {
        "daily" | "everyday" => return Ok(WeeklyRepeat::daily()),
        "weekdays" => return Ok(WeeklyRepeat::weekdays()),
        "weekends" => return Ok(WeeklyRepeat::weekends()),
        "sun" | "sunday" => SUNDAY,
        "mon" | "monday" => MONDAY,
        "tue" | "tues" | "tuesday" => TUESDAY,
        "wed" | "wednesday" => WEDNESDAY,
        "thu" | "thur" | "thurs" | "thursday" => THURSDAY,
        "fri" | "friday" => FRIDAY,
        "sat" | "saturday" => SATURDAY,
        numeric => match numeric.parse::<u8>() {
            Ok(code) => code,
            Err(_) => return Err(AlarmError::InvalidWeekdayName(token.to_string())),
        },
    };
    WeeklyRepeat::from_codes(&[code])
}

impl FromStr for WeeklyRepeat {
    type Err = AlarmError;

    /// Accepts lists like `"mon,wed,fri"`, `"1 7"`, `"weekdays"` or `"every day"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "" | "never" | "once" | "none" => return Ok(Self::once()),
            "every day" => return Ok(Self::daily()),
            _ => {}
        }

        let mut bits = 0;
        for token in lower
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            bits |= parse_token(token)?.bits;
        }
        Ok(Self { bits })
    }
}

impl TryFrom<String> for WeeklyRepeat {
    type Error = AlarmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for WeeklyRepeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "once");
        }
        let names: Vec<&str> = self
            .codes()
            .map(|code| SHORT_NAMES[usize::from(code - 1)])
            .collect();
        write!(f, "{}", names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_codes() {
        assert_eq!(weekday_code(Weekday::Sun), 1);
        assert_eq!(weekday_code(Weekday::Wed), 4);
        assert_eq!(weekday_code(Weekday::Sat), 7);
        for code in 1..=7 {
            assert_eq!(weekday_code(weekday_from_code(code).unwrap()), code);
        }
        assert_eq!(weekday_from_code(0), Err(AlarmError::InvalidWeekday(0)));
    }

    #[test]
    fn test_from_codes_rejects_out_of_range() {
        assert_eq!(
            WeeklyRepeat::from_codes(&[2, 8]),
            Err(AlarmError::InvalidWeekday(8))
        );
        assert_eq!(
            WeeklyRepeat::from_codes(&[0]),
            Err(AlarmError::InvalidWeekday(0))
        );
    }

    #[test]
    fn test_duplicates_collapse() {
        let repeat = WeeklyRepeat::from_codes(&[4, 4, 2]).unwrap();
        assert_eq!(repeat.len(), 2);
        assert_eq!(repeat.codes().collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn test_bits() {
        let repeat = WeeklyRepeat::from_codes(&[SUNDAY, SATURDAY]).unwrap();
        assert_eq!(repeat.bits(), 0b0100_0001);
        assert_eq!(repeat, WeeklyRepeat::weekends());
        assert_eq!(WeeklyRepeat::from_bits(repeat.bits()).unwrap(), repeat);
        assert_eq!(
            WeeklyRepeat::from_bits(0x80),
            Err(AlarmError::InvalidWeekdayBits(0x80))
        );
    }

    #[test]
    fn test_next_on_or_after() {
        let mwf = WeeklyRepeat::from_codes(&[MONDAY, WEDNESDAY, FRIDAY]).unwrap();
        assert_eq!(mwf.next_on_or_after(TUESDAY), Some(WEDNESDAY));
        assert_eq!(mwf.next_on_or_after(WEDNESDAY), Some(WEDNESDAY));
        // wraps past Saturday
        assert_eq!(mwf.next_on_or_after(SATURDAY), Some(MONDAY));
        assert_eq!(WeeklyRepeat::once().next_on_or_after(MONDAY), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "mon, Wed,FRIDAY".parse::<WeeklyRepeat>().unwrap(),
            WeeklyRepeat::from_codes(&[2, 4, 6]).unwrap()
        );
        assert_eq!("1 7".parse::<WeeklyRepeat>().unwrap(), WeeklyRepeat::weekends());
        assert_eq!("every day".parse::<WeeklyRepeat>().unwrap(), WeeklyRepeat::daily());
        assert_eq!("weekdays".parse::<WeeklyRepeat>().unwrap(), WeeklyRepeat::weekdays());
        assert!("".parse::<WeeklyRepeat>().unwrap().is_empty());
        assert!("once".parse::<WeeklyRepeat>().unwrap().is_empty());
        assert_eq!(
            "mon,funday".parse::<WeeklyRepeat>(),
            Err(AlarmError::InvalidWeekdayName("funday".into()))
        );
        assert_eq!("9".parse::<WeeklyRepeat>(), Err(AlarmError::InvalidWeekday(9)));
    }

    #[test]
    fn test_display() {
        assert_eq!(WeeklyRepeat::weekdays().to_string(), "Mon,Tue,Wed,Thu,Fri");
        assert_eq!(WeeklyRepeat::once().to_string(), "once");
    }
}
