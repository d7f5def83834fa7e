use clap::Parser;

use crate::{
    prelude::*,
    quantity::rate::KilowattHourRate,
    tariff::{TariffRule, TariffSchedule},
};

#[must_use]
#[derive(Parser)]
pub struct TariffArgs {
    /// Time-of-use buy rate as `<days>-<start hour>-<end hour>-<rate>`, for example `12345-7-23-0.30`.
    ///
    /// Days are numbered from 1 (Monday) to 7 (Sunday), the end hour is exclusive.
    /// The rules must cover every hour of the week exactly once.
    #[clap(long = "tariff", env = "TARIFF_RULES", value_delimiter = ',')]
    pub rules: Vec<TariffRule>,

    /// Flat buy rate per kilowatt-hour, used when no tariff rules are given.
    #[clap(long = "buy-rate", env = "BUY_RATE", default_value = "0.30")]
    pub default_rate: KilowattHourRate,
}

impl TariffArgs {
    pub fn schedule(&self) -> Result<TariffSchedule> {
        let schedule = TariffSchedule::try_new(self.rules.iter().copied(), self.default_rate)
            .context("tariff schedule is invalid")?;
        info!(n_rules = self.rules.len(), "tariff schedule is valid");
        Ok(schedule)
    }

    /// Rules in their compact form, for the run manifest.
    pub fn encoded_rules(&self) -> Vec<String> {
        self.rules.iter().map(ToString::to_string).collect()
    }
}
