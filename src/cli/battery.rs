//! Battery-related CLI arguments.

use clap::Parser;

use crate::{
    core::battery::BatteryConfig,
    prelude::*,
    quantity::{energy::WattHours, rate::KilowattHourRate},
};

#[must_use]
#[derive(Parser)]
pub struct BatteryArgs {
    /// Nominal battery capacity in watt-hours.
    #[clap(long = "battery-capacity", env = "BATTERY_CAPACITY", default_value = "10000")]
    pub capacity: WattHours,

    /// Charging efficiency, `(0, 1]`.
    #[clap(long = "charging-efficiency", env = "BATTERY_CHARGING_EFFICIENCY", default_value = "0.95")]
    pub charging_efficiency: f64,

    /// Discharging efficiency, `(0, 1]`.
    #[clap(
        long = "discharging-efficiency",
        env = "BATTERY_DISCHARGING_EFFICIENCY",
        default_value = "0.95"
    )]
    pub discharging_efficiency: f64,

    /// Initial state-of-charge as a fraction of the nominal capacity.
    #[clap(
        long = "initial-state-of-charge",
        env = "BATTERY_INITIAL_STATE_OF_CHARGE",
        default_value = "0"
    )]
    pub initial_state_of_charge: f64,

    /// Fraction of the usable capacity kept unused at both ends.
    #[clap(long = "depth-of-discharge", env = "BATTERY_DEPTH_OF_DISCHARGE", default_value = "0.3")]
    pub depth_of_discharge: f64,

    /// Number of full cycles the capacity retention is rated for.
    #[clap(long = "rated-cycles", env = "BATTERY_RATED_CYCLES", default_value = "5000")]
    pub rated_cycles: u32,

    /// Fraction of the nominal capacity left after the rated number of cycles.
    #[clap(
        long = "capacity-after-rated-cycles",
        env = "BATTERY_CAPACITY_AFTER_RATED_CYCLES",
        default_value = "0.8"
    )]
    pub capacity_after_rated_cycles: f64,

    /// Flat rate paid for the energy returned to the grid, per kilowatt-hour.
    #[clap(long = "sell-rate", env = "SELL_RATE", default_value = "0.10")]
    pub sell_rate: KilowattHourRate,
}

impl BatteryArgs {
    pub fn config(&self) -> Result<BatteryConfig> {
        self.config_with_capacity(self.capacity)
    }

    /// Same battery, different nominal capacity.
    pub fn config_with_capacity(&self, nominal_capacity: WattHours) -> Result<BatteryConfig> {
        BatteryConfig::builder()
            .nominal_capacity(nominal_capacity)
            .charging_efficiency(self.charging_efficiency)
            .discharging_efficiency(self.discharging_efficiency)
            .initial_state_of_charge(self.initial_state_of_charge)
            .depth_of_discharge(self.depth_of_discharge)
            .rated_cycles(self.rated_cycles)
            .capacity_after_rated_cycles(self.capacity_after_rated_cycles)
            .sell_rate(self.sell_rate)
            .build()
            .context("invalid battery configuration")
    }
}
