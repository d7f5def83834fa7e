use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use itertools::Itertools;
use tokio::task::JoinSet;

use crate::{
    cli::{battery::BatteryArgs, tariff::TariffArgs},
    core::{
        battery::BatteryConfig,
        sample::EnergySeries,
        simulator::{Rounding, Simulator},
        summary::Summary,
    },
    dataset,
    prelude::*,
    quantity::energy::WattHours,
    tables::build_sweep_table,
    tariff::TariffSchedule,
};

#[must_use]
#[derive(Parser)]
pub struct SweepArgs {
    /// Metering CSV with the `datetime`, `consumption`, and `reversed` columns.
    #[clap(default_value = "data/shelly_data.csv")]
    pub input: PathBuf,

    /// Nominal capacities to compare, in watt-hours.
    #[clap(
        long = "capacities",
        env = "SWEEP_CAPACITIES",
        value_delimiter = ',',
        default_value = "5000,10000,15000,20000"
    )]
    pub capacities: Vec<WattHours>,

    #[clap(long = "rounding", env = "ROUNDING", value_enum, default_value = "continuous")]
    pub rounding: Rounding,

    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub tariff: TariffArgs,
}

impl SweepArgs {
    #[instrument(skip_all)]
    pub async fn run(&self) -> Result {
        let schedule = Arc::new(self.tariff.schedule()?);
        let configs = self
            .capacities
            .iter()
            .map(|capacity| self.battery.config_with_capacity(*capacity))
            .collect::<Result<Vec<_>>>()?;
        let series = Arc::new(dataset::read_series(&self.input)?);
        let runs = sweep(configs, schedule, series, self.rounding).await?;
        println!("{}", build_sweep_table(&runs));
        Ok(())
    }
}

/// Run independent simulations concurrently, sharing the series and the schedule.
///
/// The runs are ordered by nominal capacity.
async fn sweep(
    configs: Vec<BatteryConfig>,
    schedule: Arc<TariffSchedule>,
    series: Arc<EnergySeries>,
    rounding: Rounding,
) -> Result<Vec<(WattHours, Summary)>> {
    let n_runs = configs.len();
    let mut tasks = JoinSet::new();
    for config in configs {
        let schedule = Arc::clone(&schedule);
        let series = Arc::clone(&series);
        tasks.spawn_blocking(move || {
            let simulation = Simulator::builder()
                .config(&config)
                .schedule(&schedule)
                .rounding(rounding)
                .build()
                .run(&series);
            (config.nominal_capacity, Summary::from(&simulation))
        });
    }

    let mut runs = Vec::with_capacity(n_runs);
    while let Some(result) = tasks.join_next().await {
        let (capacity, summary) = result.context("simulation task failed")?;
        info!(?capacity, savings = ?summary.savings(), "simulated");
        runs.push((capacity, summary));
    }
    Ok(runs.into_iter().sorted_by(|(lhs, _), (rhs, _)| lhs.0.total_cmp(&rhs.0)).collect())
}
