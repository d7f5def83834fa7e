use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::{
    api::shelly::{self, Api},
    dataset,
    prelude::*,
};

#[must_use]
#[derive(Parser)]
pub struct FetchArgs {
    /// First day to fetch.
    #[clap(long = "start-date")]
    pub start_date: NaiveDate,

    /// Last day to fetch, today by default.
    #[clap(long = "end-date")]
    pub end_date: Option<NaiveDate>,

    /// Metering CSV to append to. Days already present in the file are not fetched again.
    #[clap(long = "output", env = "METERING_FILE", default_value = "data/shelly_data.csv")]
    pub output: PathBuf,

    #[clap(flatten)]
    pub shelly: ShellyArgs,
}

#[derive(Parser)]
pub struct ShellyArgs {
    /// Shelly Cloud authorization key.
    #[clap(long = "shelly-auth-key", env = "SHELLY_AUTH_KEY", hide_env_values = true)]
    pub auth_key: String,

    /// Shelly energy meter device ID.
    #[clap(long = "shelly-id", env = "SHELLY_ID")]
    pub device_id: String,

    /// Shelly Cloud server, for example `shelly-77-eu.shelly.cloud`.
    #[clap(long = "shelly-url", env = "SHELLY_URL")]
    pub host: String,
}

impl FetchArgs {
    #[instrument(skip_all)]
    pub async fn run(&self) -> Result {
        let end_date = self.end_date.unwrap_or_else(|| Local::now().date_naive());
        ensure!(
            self.start_date <= end_date,
            "start date {} is after end date {end_date}",
            self.start_date,
        );
        let api = Api::try_new(&self.shelly.host, &self.shelly.device_id, &self.shelly.auth_key)?;
        dataset::ensure_writable(&self.output)?;
        let mut cached = dataset::read_timestamps(&self.output)?;
        info!(n_cached = cached.len(), start_date = %self.start_date, %end_date, "fetching…");

        let mut n_appended = 0;
        let mut n_failed_days = 0;
        for day in self.start_date.iter_days().take_while(|day| *day <= end_date) {
            if shelly::is_day_cached(&cached, day) {
                debug!(%day, "already fetched");
                continue;
            }
            let entries = match api.get_day(day).await {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(%day, "skipping the day: {error:#}");
                    n_failed_days += 1;
                    continue;
                }
            };
            let rows = shelly::new_rows(entries, &cached).collect::<Vec<_>>();
            let n_rows = dataset::append_rows(&self.output, &rows)?;
            cached.extend(rows.iter().map(|row| row.datetime));
            info!(%day, n_rows, "appended");
            n_appended += n_rows;
        }

        info!(n_appended, n_failed_days, path = %self.output.display(), "fetched");
        Ok(())
    }
}
