//! Synthetic hourly metering data with seasonal household consumption and solar production.

use std::f64::consts::PI;

use bon::Builder;
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use serde_with::serde_as;

use crate::{
    ops::RangeInclusive,
    prelude::*,
    quantity::energy::WattHours,
    timestamp::MeterTimestamp,
};

/// Morning and evening hours with the elevated household consumption.
const PEAK_HOURS: [std::ops::Range<u32>; 2] = [6..9, 17..22];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Season {
    Cold,
    Hot,
    Mild,
}

/// Seasonal household model.
#[must_use]
#[derive(Clone, Debug, Builder, Serialize)]
pub struct Model {
    #[builder(default = vec![12, 1, 2])]
    pub cold_months: Vec<u32>,

    #[builder(default = vec![6, 7, 8])]
    pub hot_months: Vec<u32>,

    #[builder(default = RangeInclusive::new(500.0, 1500.0))]
    pub base_consumption: RangeInclusive<f64>,

    #[builder(default = RangeInclusive::new(2000.0, 4500.0))]
    pub peak_consumption: RangeInclusive<f64>,

    /// Consumption multiplier in the cold months.
    #[builder(default = 1.3)]
    pub cold_factor: f64,

    /// Consumption multiplier in the hot months.
    #[builder(default = 1.2)]
    pub hot_factor: f64,

    /// Production hours in the cold months, end hour exclusive.
    #[builder(default = RangeInclusive::new(8, 16))]
    pub cold_daylight: RangeInclusive<u32>,

    #[builder(default = RangeInclusive::new(6, 20))]
    pub hot_daylight: RangeInclusive<u32>,

    #[builder(default = RangeInclusive::new(1000.0, 3000.0))]
    pub cold_production: RangeInclusive<f64>,

    #[builder(default = RangeInclusive::new(3000.0, 6000.0))]
    pub hot_production: RangeInclusive<f64>,

    /// Share of the production consumed on site before anything reaches the meter.
    #[builder(default = 0.7)]
    pub self_consumption_ratio: f64,
}

impl Model {
    pub fn validate(&self) -> Result {
        for month in self.cold_months.iter().chain(&self.hot_months) {
            ensure!((1..=12).contains(month), "invalid month: {month}");
        }
        for daylight in [self.cold_daylight, self.hot_daylight] {
            ensure!(
                daylight.min < daylight.max && daylight.max <= 24,
                "invalid daylight hours: {daylight}",
            );
        }
        for range in [
            self.base_consumption,
            self.peak_consumption,
            self.cold_production,
            self.hot_production,
        ] {
            ensure!(range.min >= 0.0 && range.max.is_finite(), "invalid energy range: {range}");
        }
        ensure!(
            RangeInclusive::new(0.0, 1.0).contains(self.self_consumption_ratio),
            "self-consumption ratio must be within 0..1",
        );
        Ok(())
    }

    fn season(&self, month: u32) -> Season {
        if self.cold_months.contains(&month) {
            Season::Cold
        } else if self.hot_months.contains(&month) {
            Season::Hot
        } else {
            Season::Mild
        }
    }

    const fn consumption_factor(&self, season: Season) -> f64 {
        match season {
            Season::Cold => self.cold_factor,
            Season::Hot => self.hot_factor,
            Season::Mild => 1.0,
        }
    }

    /// Daylight start and exclusive end hour.
    fn daylight(&self, season: Season) -> (u32, u32) {
        match season {
            Season::Cold => (self.cold_daylight.min, self.cold_daylight.max),
            Season::Hot => (self.hot_daylight.min, self.hot_daylight.max),
            Season::Mild => (
                midpoint(f64::from(self.cold_daylight.min), f64::from(self.hot_daylight.min)),
                midpoint(f64::from(self.cold_daylight.max), f64::from(self.hot_daylight.max)),
            ),
        }
    }

    fn production_range(&self, season: Season) -> RangeInclusive<f64> {
        match season {
            Season::Cold => self.cold_production,
            Season::Hot => self.hot_production,
            Season::Mild => RangeInclusive::new(
                f64::from(midpoint(self.cold_production.min, self.hot_production.min)),
                f64::from(midpoint(self.cold_production.max, self.hot_production.max)),
            ),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn midpoint(lhs: f64, rhs: f64) -> u32 {
    f64::midpoint(lhs, rhs).round() as u32
}

/// Generated hour: household totals and what the grid meter sees.
#[serde_as]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct GeneratedRow {
    #[serde_as(as = "MeterTimestamp")]
    pub datetime: NaiveDateTime,

    pub household_consumption: WattHours,
    pub production: WattHours,

    /// Taken from the grid.
    pub consumption: WattHours,

    /// Returned to the grid.
    pub reversed: WattHours,
}

pub struct Generator {
    model: Model,
    rng: StdRng,
}

impl Generator {
    /// Without a seed, the generator is seeded from the operating system.
    pub fn new(model: Model, seed: Option<u64>) -> Result<Self> {
        model.validate()?;
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Ok(Self { model, rng })
    }

    /// Generate every hour of the consecutive calendar years.
    #[instrument(skip_all, fields(start_year = start_year, n_years = n_years))]
    pub fn generate(&mut self, start_year: i32, n_years: u32) -> Result<Vec<GeneratedRow>> {
        let mut rows = Vec::new();
        for year in (start_year..).take(n_years as usize) {
            let mut timestamp = NaiveDate::from_ymd_opt(year, 1, 1)
                .with_context(|| format!("invalid year: {year}"))?
                .and_time(chrono::NaiveTime::MIN);
            while timestamp.year() == year {
                rows.push(self.generate_hour(timestamp));
                timestamp += TimeDelta::hours(1);
            }
            debug!(year, n_rows = rows.len(), "generated");
        }
        Ok(rows)
    }

    fn generate_hour(&mut self, datetime: NaiveDateTime) -> GeneratedRow {
        let hour = datetime.hour();
        let season = self.model.season(datetime.month());

        let consumption_range = if PEAK_HOURS.iter().any(|hours| hours.contains(&hour)) {
            self.model.peak_consumption
        } else {
            self.model.base_consumption
        };
        let household_consumption = WattHours::from(
            self.uniform(consumption_range) * self.model.consumption_factor(season),
        )
        .round();

        let (daylight_start, daylight_end) = self.model.daylight(season);
        let production = if (daylight_start..daylight_end).contains(&hour) {
            let phase = f64::from(hour - daylight_start) / f64::from(daylight_end - daylight_start);
            let peak = self.uniform(self.model.production_range(season));
            WattHours::from((phase * PI).sin() * peak).round()
        } else {
            WattHours::ZERO
        };

        let self_consumed =
            household_consumption.min(production * self.model.self_consumption_ratio);
        GeneratedRow {
            datetime,
            household_consumption,
            production,
            consumption: (household_consumption - self_consumed).max(WattHours::ZERO),
            reversed: (production - self_consumed).max(WattHours::ZERO),
        }
    }

    fn uniform(&mut self, range: RangeInclusive<f64>) -> f64 {
        self.rng.random_range(range.min..=range.max)
    }
}
