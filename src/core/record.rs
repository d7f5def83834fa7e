use chrono::NaiveDateTime;
use serde::Serialize;
use serde_with::serde_as;

use crate::{
    quantity::{cost::Cost, energy::WattHours, rate::KilowattHourRate},
    timestamp::MeterTimestamp,
};

/// Outcome of a single simulated step.
#[serde_as]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct SimulationRecord {
    #[serde_as(as = "MeterTimestamp")]
    pub timestamp: NaiveDateTime,

    pub consumed: WattHours,
    pub produced: WattHours,

    pub previous_state_of_charge: WattHours,
    pub state_of_charge: WattHours,

    /// Energy stored in the battery, after the charging losses.
    pub charged: WattHours,

    /// Energy taken out of the battery, before the discharging losses.
    pub discharged: WattHours,

    pub bought: WattHours,
    pub sold: WattHours,

    pub buy_rate: KilowattHourRate,
    pub cost_without_battery: Cost,
    pub revenue_without_battery: Cost,
    pub cost_with_battery: Cost,
    pub revenue_with_battery: Cost,

    /// Full equivalent cycles since the start of the run.
    pub cycles_elapsed: f64,

    pub usable_capacity: WattHours,

    /// Thresholds the step was clamped against.
    pub max_charge_threshold: WattHours,
    pub min_charge_threshold: WattHours,
}
