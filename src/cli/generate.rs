use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use crate::{
    dataset,
    manifest::Manifest,
    ops::RangeInclusive,
    prelude::*,
    synthetic::{Generator, Model},
};

#[must_use]
#[derive(Parser)]
pub struct GenerateArgs {
    #[clap(long = "output", env = "GENERATED_FILE", default_value = "data/generated_data.csv")]
    pub output: PathBuf,

    #[clap(long = "start-year", default_value = "2025")]
    pub start_year: i32,

    #[clap(long = "years", default_value = "1")]
    pub n_years: u32,

    /// Random seed for reproducible output.
    #[clap(long = "seed", env = "GENERATOR_SEED")]
    pub seed: Option<u64>,

    /// Off-peak household consumption per hour, in watt-hours.
    #[clap(long = "base-consumption", default_value = "500..1500")]
    pub base_consumption: RangeInclusive<f64>,

    /// Household consumption per hour during 06–09 and 17–22, in watt-hours.
    #[clap(long = "peak-consumption", default_value = "2000..4500")]
    pub peak_consumption: RangeInclusive<f64>,

    #[clap(long = "cold-months", value_delimiter = ',', default_value = "12,1,2")]
    pub cold_months: Vec<u32>,

    #[clap(long = "hot-months", value_delimiter = ',', default_value = "6,7,8")]
    pub hot_months: Vec<u32>,

    /// Consumption multiplier in the cold months.
    #[clap(long = "cold-factor", default_value = "1.3")]
    pub cold_factor: f64,

    /// Consumption multiplier in the hot months.
    #[clap(long = "hot-factor", default_value = "1.2")]
    pub hot_factor: f64,

    /// Share of the production consumed on site, `0..1`.
    #[clap(long = "self-consumption-ratio", default_value = "0.7")]
    pub self_consumption_ratio: f64,

    /// Production hours in the cold months, end hour exclusive.
    #[clap(long = "cold-daylight", default_value = "8..16")]
    pub cold_daylight: RangeInclusive<u32>,

    /// Production hours in the hot months, end hour exclusive.
    #[clap(long = "hot-daylight", default_value = "6..20")]
    pub hot_daylight: RangeInclusive<u32>,

    /// Peak hourly production in the cold months, in watt-hours.
    #[clap(long = "cold-production", default_value = "1000..3000")]
    pub cold_production: RangeInclusive<f64>,

    /// Peak hourly production in the hot months, in watt-hours.
    #[clap(long = "hot-production", default_value = "3000..6000")]
    pub hot_production: RangeInclusive<f64>,
}

#[derive(Serialize)]
struct Parameters {
    start_year: i32,
    n_years: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,

    model: Model,
}

impl GenerateArgs {
    fn model(&self) -> Model {
        Model::builder()
            .cold_months(self.cold_months.clone())
            .hot_months(self.hot_months.clone())
            .base_consumption(self.base_consumption)
            .peak_consumption(self.peak_consumption)
            .cold_factor(self.cold_factor)
            .hot_factor(self.hot_factor)
            .cold_daylight(self.cold_daylight)
            .hot_daylight(self.hot_daylight)
            .cold_production(self.cold_production)
            .hot_production(self.hot_production)
            .self_consumption_ratio(self.self_consumption_ratio)
            .build()
    }

    #[instrument(skip_all)]
    pub fn run(&self) -> Result {
        let model = self.model();
        let mut generator = Generator::new(model.clone(), self.seed)?;
        dataset::ensure_writable(&self.output)?;

        info!(start_year = self.start_year, n_years = self.n_years, "generating…");
        let rows = generator.generate(self.start_year, self.n_years)?;
        dataset::write_rows(&self.output, rows)?;

        let parameters =
            Parameters { start_year: self.start_year, n_years: self.n_years, seed: self.seed, model };
        Manifest::new(&self.output, parameters).write("generation")?;
        Ok(())
    }
}
