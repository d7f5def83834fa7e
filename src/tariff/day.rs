use std::fmt::{Display, Formatter};

use chrono::{Datelike, NaiveDateTime, Weekday};
use enumset::{EnumSet, EnumSetType};

use crate::tariff::ConfigurationError;

/// Day of the week, numbered from 1 (Monday) to 7 (Sunday).
#[derive(Debug, EnumSetType)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn all() -> EnumSet<Self> {
        EnumSet::all()
    }

    /// Number from 1 (Monday) to 7 (Sunday).
    #[must_use]
    pub const fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Zero-based position, suitable for per-weekday indexing.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn of(timestamp: NaiveDateTime) -> Self {
        timestamp.weekday().into()
    }
}

impl TryFrom<u32> for DayOfWeek {
    type Error = ConfigurationError;

    fn try_from(number: u32) -> Result<Self, Self::Error> {
        match number {
            1 => Ok(Self::Monday),
            2 => Ok(Self::Tuesday),
            3 => Ok(Self::Wednesday),
            4 => Ok(Self::Thursday),
            5 => Ok(Self::Friday),
            6 => Ok(Self::Saturday),
            7 => Ok(Self::Sunday),
            _ => Err(ConfigurationError::InvalidDay(number)),
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

impl Display for DayOfWeek {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn numbering_starts_on_monday() -> anyhow::Result<()> {
        assert_eq!(DayOfWeek::try_from(1)?, DayOfWeek::Monday);
        assert_eq!(DayOfWeek::try_from(7)?, DayOfWeek::Sunday);
        assert_eq!(DayOfWeek::Sunday.number(), 7);
        Ok(())
    }

    #[test]
    fn out_of_range() {
        assert!(DayOfWeek::try_from(0).is_err());
        assert!(DayOfWeek::try_from(8).is_err());
    }

    #[test]
    fn of_timestamp() {
        // 2025-01-01 is a Wednesday.
        let timestamp = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(13, 0, 0).unwrap();
        assert_eq!(DayOfWeek::of(timestamp), DayOfWeek::Wednesday);
    }
}
