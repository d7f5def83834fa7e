use bon::Builder;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{
    core::{
        battery::{BatteryConfig, BatteryState},
        record::SimulationRecord,
        sample::{EnergySample, EnergySeries},
    },
    prelude::*,
    quantity::energy::WattHours,
    tariff::TariffSchedule,
};

/// Resolution of the simulated energy flows.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Rounding {
    /// Keep fractional watt-hours.
    #[default]
    Continuous,

    /// Whole watt-hours: battery flows are truncated, clamped grid flows are rounded.
    WattHours,
}

impl Rounding {
    fn battery_flow(self, energy: WattHours) -> WattHours {
        match self {
            Self::Continuous => energy,
            Self::WattHours => energy.trunc(),
        }
    }

    fn grid_flow(self, energy: WattHours) -> WattHours {
        let energy = match self {
            Self::Continuous => energy,
            Self::WattHours => energy.round(),
        };
        energy.max(WattHours::ZERO)
    }
}

/// Outcome of a single step.
#[must_use]
pub enum Transition {
    Alive(BatteryState, SimulationRecord),

    /// Usable capacity has dropped to zero, the sample produces no record.
    Exhausted,
}

/// Result of a simulation run.
#[must_use]
pub struct Simulation {
    pub records: Vec<SimulationRecord>,

    /// State after the last recorded step.
    pub final_state: BatteryState,

    /// Timestamp of the sample at which the battery died, if it did.
    pub exhausted_at: Option<NaiveDateTime>,
}

/// Greedy dispatch: surplus production charges the battery, demand discharges it.
#[must_use]
#[derive(Builder)]
pub struct Simulator<'a> {
    config: &'a BatteryConfig,
    schedule: &'a TariffSchedule,

    #[builder(default)]
    rounding: Rounding,
}

impl Simulator<'_> {
    /// Simulate a fresh battery over the series.
    pub fn run(&self, series: &EnergySeries) -> Simulation {
        self.run_from(BatteryState::new(self.config), series)
    }

    /// Simulate the series starting from the given battery state.
    #[instrument(skip_all, fields(n_samples = series.len()))]
    pub fn run_from(&self, mut state: BatteryState, series: &EnergySeries) -> Simulation {
        let mut records = Vec::with_capacity(series.len());
        for sample in series.iter() {
            match self.step(state, sample) {
                Transition::Alive(next_state, record) => {
                    trace!(
                        timestamp = %record.timestamp,
                        state_of_charge = ?record.state_of_charge,
                        charged = ?record.charged,
                        discharged = ?record.discharged,
                        bought = ?record.bought,
                        sold = ?record.sold
                    );
                    state = next_state;
                    records.push(record);
                }
                Transition::Exhausted => {
                    warn!(
                        timestamp = %sample.timestamp,
                        n_records = records.len(),
                        "battery exhausted, stopping the simulation"
                    );
                    return Simulation {
                        records,
                        final_state: state,
                        exhausted_at: Some(sample.timestamp),
                    };
                }
            }
        }
        Simulation { records, final_state: state, exhausted_at: None }
    }

    /// Advance the battery by one sample.
    pub fn step(&self, state: BatteryState, sample: &EnergySample) -> Transition {
        let previous_state_of_charge = state.state_of_charge;

        let (charged, sold) =
            self.charge(previous_state_of_charge, state.max_charge_threshold, sample.produced);
        let state_of_charge = previous_state_of_charge + charged;

        let Discharge { discharged, drawn, bought } =
            self.discharge(state_of_charge, state.min_charge_threshold, sample.consumed);
        let state_of_charge = state_of_charge - drawn;

        let buy_rate = self.schedule.rate_on(sample.timestamp);
        let sell_rate = self.config.sell_rate;

        let cumulative_discharged = state.cumulative_discharged + discharged;
        let cycles_elapsed = cumulative_discharged / self.config.nominal_capacity;
        let usable_capacity =
            self.config.nominal_capacity - self.config.loss_per_cycle() * cycles_elapsed;
        if usable_capacity <= WattHours::ZERO {
            return Transition::Exhausted;
        }

        let record = SimulationRecord {
            timestamp: sample.timestamp,
            consumed: sample.consumed,
            produced: sample.produced,
            previous_state_of_charge,
            state_of_charge,
            charged,
            discharged,
            bought,
            sold,
            buy_rate,
            cost_without_battery: sample.consumed * buy_rate,
            revenue_without_battery: sample.produced * sell_rate,
            cost_with_battery: bought * buy_rate,
            revenue_with_battery: sold * sell_rate,
            cycles_elapsed,
            usable_capacity,
            max_charge_threshold: state.max_charge_threshold,
            min_charge_threshold: state.min_charge_threshold,
        };
        let next_state = BatteryState { state_of_charge, cumulative_discharged, ..state }
            .with_usable_capacity(usable_capacity, self.config.depth_of_discharge);
        Transition::Alive(next_state, record)
    }

    /// Returns the charged and sold energy.
    fn charge(
        &self,
        state_of_charge: WattHours,
        max_charge_threshold: WattHours,
        produced: WattHours,
    ) -> (WattHours, WattHours) {
        if produced <= WattHours::ZERO {
            return (WattHours::ZERO, WattHours::ZERO);
        }
        let efficiency = self.config.charging_efficiency;
        let requested = produced * efficiency;

        // Never drains the battery when it already sits above the threshold:
        let headroom = (max_charge_threshold - state_of_charge).max(WattHours::ZERO);

        if requested <= headroom {
            (self.rounding.battery_flow(requested), WattHours::ZERO)
        } else {
            let charged = self.rounding.battery_flow(headroom);
            (charged, self.rounding.grid_flow(produced - charged / efficiency))
        }
    }

    fn discharge(
        &self,
        state_of_charge: WattHours,
        min_charge_threshold: WattHours,
        consumed: WattHours,
    ) -> Discharge {
        if consumed <= WattHours::ZERO {
            return Discharge::IDLE;
        }
        if state_of_charge <= min_charge_threshold {
            return Discharge { bought: self.rounding.grid_flow(consumed), ..Discharge::IDLE };
        }
        let efficiency = self.config.discharging_efficiency;
        let requested = consumed / efficiency;
        let available = state_of_charge - min_charge_threshold;

        if requested <= available {
            Discharge {
                discharged: self.rounding.battery_flow(consumed * efficiency),
                drawn: self.rounding.battery_flow(requested),
                bought: WattHours::ZERO,
            }
        } else {
            let discharged = self.rounding.battery_flow(available);
            Discharge {
                discharged,
                drawn: discharged,
                bought: self.rounding.grid_flow(consumed - discharged * efficiency),
            }
        }
    }
}

/// Outcome of the discharge phase.
struct Discharge {
    /// Energy accounted as discharged, drives the degradation.
    discharged: WattHours,

    /// Decrease of the state of charge.
    drawn: WattHours,

    bought: WattHours,
}

impl Discharge {
    const IDLE: Self =
        Self { discharged: WattHours::ZERO, drawn: WattHours::ZERO, bought: WattHours::ZERO };
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{NaiveDate, TimeDelta};

    use super::*;
    use crate::quantity::rate::KilowattHourRate;

    fn config(initial_state_of_charge: f64) -> Result<BatteryConfig> {
        BatteryConfig::builder()
            .nominal_capacity(WattHours::from(10_000.0))
            .charging_efficiency(0.95)
            .discharging_efficiency(0.95)
            .initial_state_of_charge(initial_state_of_charge)
            .depth_of_discharge(0.3)
            .rated_cycles(5000)
            .capacity_after_rated_cycles(0.8)
            .sell_rate(KilowattHourRate::from(0.10))
            .build()
    }

    fn schedule() -> TariffSchedule {
        TariffSchedule::flat(KilowattHourRate::from(0.30)).unwrap()
    }

    /// Hourly samples starting on Monday, 2025-01-06 at 10:00.
    fn series(flows: &[(f64, f64)]) -> EnergySeries {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap().and_hms_opt(10, 0, 0).unwrap();
        flows
            .iter()
            .zip(0..)
            .map(|(&(consumed, produced), hour)| EnergySample {
                timestamp: start + TimeDelta::hours(hour),
                consumed: WattHours::from(consumed),
                produced: WattHours::from(produced),
            })
            .collect()
    }

    fn single(config: &BatteryConfig, consumed: f64, produced: f64) -> SimulationRecord {
        let schedule = schedule();
        let simulation = Simulator::builder()
            .config(config)
            .schedule(&schedule)
            .build()
            .run(&series(&[(consumed, produced)]));
        assert_eq!(simulation.records.len(), 1);
        simulation.records[0]
    }

    /// Verify normal charging without overflowing.
    #[test]
    fn normal_charging() -> Result {
        let record = single(&config(0.2)?, 0.0, 5000.0);
        assert_abs_diff_eq!(record.previous_state_of_charge.0, 2000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.charged.0, 4750.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.sold.0, 0.0);
        assert_abs_diff_eq!(record.state_of_charge.0, 6750.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.revenue_without_battery.0, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(record.revenue_with_battery.0, 0.0);
        Ok(())
    }

    /// Verify that the surplus is sold once the battery is full.
    #[test]
    fn overflow() -> Result {
        let record = single(&config(0.2)?, 0.0, 10_000.0);
        assert_abs_diff_eq!(record.charged.0, 5000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.state_of_charge.0, 7000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.sold.0, 10_000.0 - 5000.0 / 0.95, epsilon = 1e-9);
        Ok(())
    }

    /// Verify that an already depleted battery leaves the whole demand to the grid.
    #[test]
    fn underflow() -> Result {
        let record = single(&config(0.2)?, 8000.0, 0.0);
        assert_abs_diff_eq!(record.discharged.0, 0.0);
        assert_abs_diff_eq!(record.bought.0, 8000.0);
        assert_abs_diff_eq!(record.state_of_charge.0, 2000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.cost_without_battery.0, 2.4, epsilon = 1e-9);
        assert_abs_diff_eq!(record.cost_with_battery.0, 2.4, epsilon = 1e-9);
        Ok(())
    }

    /// Unclamped discharge accounts `consumed × efficiency` while the charge drops by `consumed / efficiency`.
    #[test]
    fn normal_discharging() -> Result {
        let config = config(0.6)?;
        let record = single(&config, 1900.0, 0.0);
        assert_abs_diff_eq!(record.discharged.0, 1805.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.bought.0, 0.0);
        assert_abs_diff_eq!(record.state_of_charge.0, 4000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.cost_with_battery.0, 0.0);
        assert_abs_diff_eq!(record.cycles_elapsed, 0.1805, epsilon = 1e-12);
        assert_abs_diff_eq!(
            record.usable_capacity.0,
            10_000.0 - config.loss_per_cycle().0 * 0.1805,
            epsilon = 1e-9,
        );
        Ok(())
    }

    /// Verify that the discharge stops at the minimum threshold and the rest is bought.
    #[test]
    fn partial_discharging() -> Result {
        let record = single(&config(0.5)?, 3000.0, 0.0);
        assert_abs_diff_eq!(record.discharged.0, 2000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.state_of_charge.0, 3000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.bought.0, 1100.0, epsilon = 1e-9);
        Ok(())
    }

    /// Charging happens before discharging within the same step.
    #[test]
    fn charge_then_discharge() -> Result {
        let record = single(&config(0.3)?, 760.0, 1000.0);
        assert_abs_diff_eq!(record.charged.0, 950.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.discharged.0, 722.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.bought.0, 0.0);
        assert_abs_diff_eq!(record.state_of_charge.0, 3150.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn above_max_threshold_does_not_drain() -> Result {
        let record = single(&config(0.9)?, 0.0, 1000.0);
        assert_abs_diff_eq!(record.charged.0, 0.0);
        assert_abs_diff_eq!(record.sold.0, 1000.0);
        assert_abs_diff_eq!(record.state_of_charge.0, 9000.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn whole_watt_hours() -> Result {
        let config = config(0.2)?;
        let schedule = schedule();
        let simulator = Simulator::builder()
            .config(&config)
            .schedule(&schedule)
            .rounding(Rounding::WattHours)
            .build();
        let simulation = simulator.run(&series(&[(0.0, 10_000.0), (1234.5, 0.0)]));
        let [charging, discharging] = simulation.records.as_slice() else {
            panic!("expected two records");
        };
        assert_abs_diff_eq!(charging.charged.0, 5000.0);
        assert_abs_diff_eq!(charging.sold.0, 4737.0);
        assert_abs_diff_eq!(discharging.discharged.0, 1172.0);
        assert_abs_diff_eq!(discharging.state_of_charge.0, 5701.0);
        assert_abs_diff_eq!(discharging.bought.0, 0.0);
        Ok(())
    }

    /// Check the flow bounds, energy conservation, and degradation over a mixed day.
    #[test]
    fn invariants() -> Result {
        let config = config(0.5)?;
        let schedule = schedule();
        let flows = (0..72)
            .map(|hour| {
                let hour = f64::from(hour % 24);
                let produced = if (8.0..18.0).contains(&hour) { 700.0 * hour - 5000.0 } else { 0.0 };
                let consumed = if produced > 0.0 { 0.0 } else { 300.0 + 40.0 * hour };
                (consumed, produced.max(0.0))
            })
            .collect::<Vec<_>>();
        let simulation =
            Simulator::builder().config(&config).schedule(&schedule).build().run(&series(&flows));
        assert_eq!(simulation.records.len(), 72);
        assert!(simulation.exhausted_at.is_none());

        for record in &simulation.records {
            assert!(record.charged >= WattHours::ZERO);
            assert!(record.discharged >= WattHours::ZERO);
            assert!(record.bought >= WattHours::ZERO);
            assert!(record.sold >= WattHours::ZERO);
            assert!(record.state_of_charge.0 >= record.min_charge_threshold.0 - 1e-9);
            assert!(record.state_of_charge.0 <= record.max_charge_threshold.0 + 1e-9);
            if record.consumed == WattHours::ZERO {
                assert_abs_diff_eq!(
                    (record.charged / config.charging_efficiency + record.sold).0,
                    record.produced.0,
                    epsilon = 1e-9,
                );
            }
        }
        for (previous, next) in simulation.records.iter().zip(&simulation.records[1..]) {
            assert!(next.usable_capacity <= previous.usable_capacity);
            assert!(next.cycles_elapsed >= previous.cycles_elapsed);
            assert_eq!(next.previous_state_of_charge, previous.state_of_charge);
        }
        Ok(())
    }

    /// At unit efficiency, the charged and sold energy add up to the production.
    #[test]
    fn conservation_at_unit_efficiency() -> Result {
        let config = BatteryConfig::builder()
            .nominal_capacity(WattHours::from(10_000.0))
            .charging_efficiency(1.0)
            .discharging_efficiency(1.0)
            .depth_of_discharge(0.0)
            .rated_cycles(5000)
            .capacity_after_rated_cycles(0.8)
            .sell_rate(KilowattHourRate::from(0.10))
            .build()?;
        let record = single(&config, 0.0, 12_345.0);
        assert_abs_diff_eq!(record.charged.0 + record.sold.0, 12_345.0, epsilon = 1e-9);
        Ok(())
    }

    /// A fresh battery, even one starting above its maximum threshold, never discharges below zero usable capacity.
    #[test]
    fn fresh_state_outlives_harsh_fade() -> Result {
        let config = BatteryConfig::builder()
            .nominal_capacity(WattHours::from(10_000.0))
            .charging_efficiency(1.0)
            .discharging_efficiency(1.0)
            .initial_state_of_charge(1.0)
            .depth_of_discharge(0.3)
            .rated_cycles(1)
            .capacity_after_rated_cycles(0.01)
            .sell_rate(KilowattHourRate::ZERO)
            .build()?;
        let schedule = schedule();
        let flows = (0..200)
            .map(|step| if step % 2 == 0 { (10_000.0, 0.0) } else { (0.0, 10_000.0) })
            .collect::<Vec<_>>();
        let simulation =
            Simulator::builder().config(&config).schedule(&schedule).build().run(&series(&flows));

        assert!(simulation.exhausted_at.is_none());
        assert_eq!(simulation.records.len(), 200);
        for record in &simulation.records {
            assert!(record.usable_capacity > WattHours::ZERO);
            assert!(record.state_of_charge <= record.usable_capacity);
        }
        Ok(())
    }

    #[test]
    fn exhaustion_truncates_the_run() -> Result {
        let config = BatteryConfig::builder()
            .nominal_capacity(WattHours::from(10_000.0))
            .charging_efficiency(1.0)
            .discharging_efficiency(1.0)
            .depth_of_discharge(0.3)
            .rated_cycles(1)
            .capacity_after_rated_cycles(0.5)
            .sell_rate(KilowattHourRate::ZERO)
            .build()?;
        let schedule = schedule();

        // 1.9 cycles in, 500 Wh of usable capacity left:
        let state = BatteryState {
            state_of_charge: WattHours::from(5000.0),
            cumulative_discharged: WattHours::from(19_000.0),
            ..BatteryState::new(&config)
        }
        .with_usable_capacity(WattHours::from(500.0), config.depth_of_discharge);

        let series = series(&[(500.0, 0.0), (1000.0, 0.0), (100.0, 0.0)]);
        let simulation =
            Simulator::builder().config(&config).schedule(&schedule).build().run_from(state, &series);

        assert_eq!(simulation.records.len(), 1);
        assert_abs_diff_eq!(simulation.records[0].usable_capacity.0, 250.0, epsilon = 1e-9);
        assert_eq!(simulation.exhausted_at, Some(series[1].timestamp));
        assert_abs_diff_eq!(simulation.final_state.cumulative_discharged.0, 19_500.0);
        Ok(())
    }
}
