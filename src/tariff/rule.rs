use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use enumset::EnumSet;

use crate::{
    quantity::rate::KilowattHourRate,
    tariff::{ConfigurationError, DayOfWeek, TimeWindow},
};

/// Buy rate applying within a time window.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TariffRule {
    pub window: TimeWindow,
    pub rate: KilowattHourRate,
}

impl TariffRule {
    pub fn try_new(window: TimeWindow, rate: KilowattHourRate) -> Result<Self, ConfigurationError> {
        if !rate.is_finite() || rate.is_sign_negative() {
            return Err(ConfigurationError::InvalidRate(rate.0));
        }
        Ok(Self { window, rate })
    }
}

/// Parse the compact `<days>-<start hour>-<end hour>-<rate>` form, for example `12345-7-23-0.30`.
impl FromStr for TariffRule {
    type Err = ConfigurationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| ConfigurationError::Malformed { input: input.to_string(), reason };

        let mut parts = input.trim().splitn(4, '-');
        let (Some(days), Some(start_hour), Some(end_hour), Some(rate)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed("expected `<days>-<start hour>-<end hour>-<rate>`"));
        };

        let days = days
            .chars()
            .map(|digit| {
                digit.to_digit(10).ok_or_else(|| malformed("days must be digits from 1 to 7"))
            })
            .map(|number| number.and_then(DayOfWeek::try_from))
            .collect::<Result<EnumSet<_>, _>>()?;
        let start_hour = start_hour.parse().map_err(|_| malformed("invalid start hour"))?;
        let end_hour = end_hour.parse().map_err(|_| malformed("invalid end hour"))?;
        let rate = rate.parse::<f64>().map_err(|_| malformed("invalid rate"))?;

        Self::try_new(TimeWindow::try_new(start_hour, end_hour, days)?, rate.into())
    }
}

impl Display for TariffRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for day in self.window.days() {
            write!(f, "{}", day.number())?;
        }
        write!(f, "-{}-{}-{}", self.window.start_hour(), self.window.end_hour(), self.rate.0)
    }
}
