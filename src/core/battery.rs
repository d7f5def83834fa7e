use bon::bon;
use serde::Serialize;

use crate::{
    prelude::*,
    quantity::{energy::WattHours, rate::KilowattHourRate},
};

/// Battery parameters and export terms, validated on construction.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct BatteryConfig {
    pub nominal_capacity: WattHours,

    /// Charging efficiency, `(0, 1]`.
    pub charging_efficiency: f64,

    /// Discharging efficiency, `(0, 1]`.
    pub discharging_efficiency: f64,

    /// Initial state-of-charge as a fraction of the nominal capacity.
    pub initial_state_of_charge: f64,

    /// Fraction of the usable capacity reserved at both ends, `[0, 1)`.
    pub depth_of_discharge: f64,

    pub rated_cycles: u32,

    /// Fraction of the nominal capacity left after the rated number of cycles.
    pub capacity_after_rated_cycles: f64,

    /// Flat rate paid for exported energy.
    pub sell_rate: KilowattHourRate,
}

#[bon]
impl BatteryConfig {
    #[builder]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nominal_capacity: WattHours,
        charging_efficiency: f64,
        discharging_efficiency: f64,
        #[builder(default)] initial_state_of_charge: f64,
        depth_of_discharge: f64,
        rated_cycles: u32,
        capacity_after_rated_cycles: f64,
        sell_rate: KilowattHourRate,
    ) -> Result<Self> {
        ensure!(
            nominal_capacity.is_finite() && nominal_capacity > WattHours::ZERO,
            "invalid nominal capacity: {nominal_capacity}",
        );
        if !(charging_efficiency > 0.0 && charging_efficiency <= 1.0) {
            bail!("invalid charging efficiency: {charging_efficiency}");
        }
        if !(discharging_efficiency > 0.0 && discharging_efficiency <= 1.0) {
            bail!("invalid discharging efficiency: {discharging_efficiency}");
        }
        if !(0.0..=1.0).contains(&initial_state_of_charge) {
            bail!("invalid initial state-of-charge: {initial_state_of_charge}");
        }
        if !(0.0..1.0).contains(&depth_of_discharge) {
            bail!("invalid depth of discharge: {depth_of_discharge}");
        }
        ensure!(rated_cycles > 0, "rated cycle count must be positive");
        if !(capacity_after_rated_cycles > 0.0 && capacity_after_rated_cycles <= 1.0) {
            bail!("invalid capacity after rated cycles: {capacity_after_rated_cycles}");
        }
        ensure!(
            sell_rate.is_finite() && !sell_rate.is_sign_negative(),
            "invalid sell rate: {sell_rate}",
        );
        Ok(Self {
            nominal_capacity,
            charging_efficiency,
            discharging_efficiency,
            initial_state_of_charge,
            depth_of_discharge,
            rated_cycles,
            capacity_after_rated_cycles,
            sell_rate,
        })
    }
}

impl BatteryConfig {
    /// Usable capacity lost per full equivalent cycle.
    pub fn loss_per_cycle(&self) -> WattHours {
        self.nominal_capacity * (1.0 - self.capacity_after_rated_cycles)
            / f64::from(self.rated_cycles)
    }
}

/// Battery state carried from one step to the next.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct BatteryState {
    pub state_of_charge: WattHours,
    pub usable_capacity: WattHours,

    /// Total energy taken out of the battery so far.
    pub cumulative_discharged: WattHours,

    pub max_charge_threshold: WattHours,
    pub min_charge_threshold: WattHours,
}

impl BatteryState {
    /// Fresh battery at the configured initial state-of-charge.
    ///
    /// The initial state-of-charge is not clamped: it may start outside the allowed band.
    pub fn new(config: &BatteryConfig) -> Self {
        Self {
            state_of_charge: config.nominal_capacity * config.initial_state_of_charge,
            usable_capacity: config.nominal_capacity,
            cumulative_discharged: WattHours::ZERO,
            max_charge_threshold: WattHours::ZERO,
            min_charge_threshold: WattHours::ZERO,
        }
        .with_usable_capacity(config.nominal_capacity, config.depth_of_discharge)
    }

    /// Update the usable capacity and the thresholds derived from it.
    pub fn with_usable_capacity(mut self, usable_capacity: WattHours, depth_of_discharge: f64) -> Self {
        self.usable_capacity = usable_capacity;
        self.max_charge_threshold = usable_capacity * (1.0 - depth_of_discharge);
        self.min_charge_threshold = usable_capacity * depth_of_discharge;
        self
    }
}
