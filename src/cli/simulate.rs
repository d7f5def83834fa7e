use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;

use crate::{
    cli::{battery::BatteryArgs, tariff::TariffArgs},
    core::{
        battery::BatteryConfig,
        simulator::{Rounding, Simulator},
        summary::Summary,
    },
    dataset,
    manifest::Manifest,
    prelude::*,
    quantity::rate::KilowattHourRate,
    tables::build_summary_table,
};

#[must_use]
#[derive(Parser)]
pub struct SimulateArgs {
    /// Metering CSV with the `datetime`, `consumption`, and `reversed` columns.
    #[clap(default_value = "data/shelly_data.csv")]
    pub input: PathBuf,

    /// Per-step simulation results CSV.
    #[clap(default_value = "output/simulation_results.csv")]
    pub output: PathBuf,

    #[clap(long = "rounding", env = "ROUNDING", value_enum, default_value = "continuous")]
    pub rounding: Rounding,

    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub tariff: TariffArgs,
}

#[derive(Serialize)]
struct Parameters<'a> {
    input: &'a Path,
    rounding: Rounding,
    battery: BatteryConfig,
    tariff_rules: Vec<String>,
    default_buy_rate: KilowattHourRate,
}

impl SimulateArgs {
    #[instrument(skip_all)]
    pub fn run(&self) -> Result {
        let schedule = self.tariff.schedule()?;
        let config = self.battery.config()?;
        dataset::ensure_writable(&self.output)?;
        let series = dataset::read_series(&self.input)?;

        info!(nominal_capacity = ?config.nominal_capacity, rounding = ?self.rounding, "simulating…");
        let simulation = Simulator::builder()
            .config(&config)
            .schedule(&schedule)
            .rounding(self.rounding)
            .build()
            .run(&series);
        dataset::write_rows(&self.output, &simulation.records)?;

        let parameters = Parameters {
            input: &self.input,
            rounding: self.rounding,
            battery: config,
            tariff_rules: self.tariff.encoded_rules(),
            default_buy_rate: self.tariff.default_rate,
        };
        Manifest::new(&self.output, parameters).write("simulation")?;

        println!("{}", build_summary_table(&Summary::from(&simulation)));
        Ok(())
    }
}
