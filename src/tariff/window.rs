use enumset::EnumSet;

use crate::tariff::{ConfigurationError, DayOfWeek};

/// Hours `[start_hour, end_hour)` on the selected weekdays.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    start_hour: u32,
    end_hour: u32,
    days: EnumSet<DayOfWeek>,
}

impl TimeWindow {
    pub fn try_new(
        start_hour: u32,
        end_hour: u32,
        days: EnumSet<DayOfWeek>,
    ) -> Result<Self, ConfigurationError> {
        if start_hour >= 24 {
            return Err(ConfigurationError::InvalidStartHour(start_hour));
        }
        if end_hour == 0 || end_hour > 24 {
            return Err(ConfigurationError::InvalidEndHour(end_hour));
        }
        if start_hour >= end_hour {
            return Err(ConfigurationError::EmptyWindow { start_hour, end_hour });
        }
        if days.is_empty() {
            return Err(ConfigurationError::NoDays);
        }
        Ok(Self { start_hour, end_hour, days })
    }

    /// The whole week, around the clock.
    pub fn always() -> Self {
        Self { start_hour: 0, end_hour: 24, days: DayOfWeek::all() }
    }

    #[must_use]
    pub const fn start_hour(&self) -> u32 {
        self.start_hour
    }

    #[must_use]
    pub const fn end_hour(&self) -> u32 {
        self.end_hour
    }

    #[must_use]
    pub const fn days(&self) -> EnumSet<DayOfWeek> {
        self.days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_hours() {
        let days = DayOfWeek::all();
        assert_eq!(
            TimeWindow::try_new(24, 24, days),
            Err(ConfigurationError::InvalidStartHour(24)),
        );
        assert_eq!(TimeWindow::try_new(0, 25, days), Err(ConfigurationError::InvalidEndHour(25)));
        assert_eq!(
            TimeWindow::try_new(12, 12, days),
            Err(ConfigurationError::EmptyWindow { start_hour: 12, end_hour: 12 }),
        );
        assert_eq!(
            TimeWindow::try_new(13, 12, days),
            Err(ConfigurationError::EmptyWindow { start_hour: 13, end_hour: 12 }),
        );
    }

    #[test]
    fn rejects_empty_days() {
        assert_eq!(TimeWindow::try_new(0, 24, EnumSet::empty()), Err(ConfigurationError::NoDays));
    }
}
