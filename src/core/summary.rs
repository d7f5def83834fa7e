use chrono::NaiveDateTime;

use crate::{
    core::simulator::Simulation,
    quantity::{cost::Cost, energy::WattHours},
};

/// Simulation totals.
#[must_use]
#[derive(Copy, Clone, Debug, Default)]
pub struct Summary {
    pub n_records: usize,
    pub consumed: WattHours,
    pub produced: WattHours,
    pub charged: WattHours,
    pub discharged: WattHours,
    pub bought: WattHours,
    pub sold: WattHours,
    pub cost_without_battery: Cost,
    pub revenue_without_battery: Cost,
    pub cost_with_battery: Cost,
    pub revenue_with_battery: Cost,
    pub cycles_elapsed: f64,
    pub usable_capacity: WattHours,
    pub exhausted_at: Option<NaiveDateTime>,
}

impl Summary {
    pub fn net_cost_without_battery(&self) -> Cost {
        self.cost_without_battery - self.revenue_without_battery
    }

    pub fn net_cost_with_battery(&self) -> Cost {
        self.cost_with_battery - self.revenue_with_battery
    }

    /// Net cost reduction thanks to the battery.
    pub fn savings(&self) -> Cost {
        // We expect that with the battery we pay less…
        self.net_cost_without_battery() - self.net_cost_with_battery()
    }
}

impl From<&Simulation> for Summary {
    fn from(simulation: &Simulation) -> Self {
        let mut summary = simulation.records.iter().fold(Self::default(), |mut summary, record| {
            summary.consumed += record.consumed;
            summary.produced += record.produced;
            summary.charged += record.charged;
            summary.discharged += record.discharged;
            summary.bought += record.bought;
            summary.sold += record.sold;
            summary.cost_without_battery += record.cost_without_battery;
            summary.revenue_without_battery += record.revenue_without_battery;
            summary.cost_with_battery += record.cost_with_battery;
            summary.revenue_with_battery += record.revenue_with_battery;
            summary.cycles_elapsed = record.cycles_elapsed;
            summary
        });
        summary.n_records = simulation.records.len();
        summary.usable_capacity = simulation.final_state.usable_capacity;
        summary.exhausted_at = simulation.exhausted_at;
        summary
    }
}
