//! Shelly Cloud energy statistics of a 3-phase energy meter.

use std::{collections::BTreeSet, time::Duration};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use reqwest::Url;
use serde::Deserialize;
use serde_with::serde_as;

use crate::{
    dataset::MeterRow,
    prelude::*,
    quantity::energy::WattHours,
    timestamp::MeterTimestamp,
};

pub struct Api {
    client: reqwest::Client,
    url: Url,
    device_id: String,
    auth_key: String,
}

impl Api {
    #[instrument(skip_all, fields(host = host, device_id = device_id))]
    pub fn try_new(host: &str, device_id: &str, auth_key: &str) -> Result<Self> {
        ensure!(!host.trim().is_empty(), "Shelly Cloud host is not set");
        ensure!(!device_id.trim().is_empty(), "Shelly device ID is not set");
        ensure!(!auth_key.trim().is_empty(), "Shelly authorization key is not set");

        let url = Url::parse(&format!(
            "https://{}/v2/statistics/power-consumption/em-3p",
            host.trim().trim_start_matches("https://"),
        ))
        .with_context(|| format!("invalid Shelly Cloud host `{host}`"))?;
        let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            url,
            device_id: device_id.trim().to_string(),
            auth_key: auth_key.trim().to_string(),
        })
    }

    /// Hourly statistics of the day.
    #[instrument(skip_all, fields(day = %day))]
    pub async fn get_day(&self, day: NaiveDate) -> Result<Vec<Entry>> {
        let date_from = day.and_time(NaiveTime::MIN).format(crate::timestamp::FORMAT).to_string();
        let response: Response = self
            .client
            .get(self.url.clone())
            .query(&[
                ("date_from", date_from.as_str()),
                ("date_range", "day"),
                ("channel", "0"),
                ("id", self.device_id.as_str()),
                ("auth_key", self.auth_key.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("failed to fetch the statistics for {day}"))?
            .error_for_status()
            .with_context(|| format!("failed to fetch the statistics for {day}"))?
            .json()
            .await
            .with_context(|| format!("failed to deserialize the statistics for {day}"))?;
        debug!(n_entries = response.entries.len(), "fetched");
        Ok(response.entries)
    }
}

#[serde_as]
#[derive(Deserialize)]
struct Response {
    #[serde(rename = "sum")]
    #[serde_as(as = "serde_with::VecSkipError<_>")]
    entries: Vec<Entry>,
}

#[serde_as]
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct Entry {
    #[serde_as(as = "MeterTimestamp")]
    pub datetime: NaiveDateTime,

    pub consumption: Option<WattHours>,
    pub reversed: Option<WattHours>,

    #[serde(default)]
    pub missing: bool,
}

impl Entry {
    /// Metering row, unless the meter has not reported the hour.
    #[must_use]
    pub fn to_row(self) -> Option<MeterRow> {
        if self.missing {
            return None;
        }
        Some(MeterRow {
            datetime: self.datetime,
            consumption: self.consumption?,
            reversed: self.reversed?,
        })
    }
}

/// Whether the first and the last hour of the day are already stored.
#[must_use]
pub fn is_day_cached(cached: &BTreeSet<NaiveDateTime>, day: NaiveDate) -> bool {
    let midnight = day.and_time(NaiveTime::MIN);
    cached.contains(&midnight) && cached.contains(&(midnight + TimeDelta::hours(23)))
}

/// Reported rows that are not stored yet.
pub fn new_rows(
    entries: impl IntoIterator<Item = Entry>,
    cached: &BTreeSet<NaiveDateTime>,
) -> impl Iterator<Item = MeterRow> {
    entries
        .into_iter()
        .filter_map(Entry::to_row)
        .filter(|row| !cached.contains(&row.datetime))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn deserialize_response_ok() -> Result {
        // language=JSON
        let body = r#"{
            "timezone": "Europe/Amsterdam",
            "interval": "day",
            "sum": [
                {"datetime": "2025-03-01 00:00:00", "consumption": 312.5, "reversed": 0, "missing": false},
                {"datetime": "2025-03-01 01:00:00", "consumption": 280.1, "reversed": 0},
                {"datetime": "2025-03-01 02:00:00", "missing": true},
                {"datetime": "garbage", "consumption": 1, "reversed": 1}
            ]
        }"#;
        let response = serde_json::from_str::<Response>(body)?;
        assert_eq!(response.entries.len(), 3);
        assert_abs_diff_eq!(response.entries[0].consumption.unwrap().0, 312.5);
        assert!(response.entries[2].missing);
        Ok(())
    }

    #[test]
    fn missing_entries_are_skipped() {
        let entry = Entry {
            datetime: day().and_time(NaiveTime::MIN),
            consumption: Some(WattHours::from(1.0)),
            reversed: Some(WattHours::ZERO),
            missing: true,
        };
        assert!(entry.to_row().is_none());
        assert!(Entry { missing: false, reversed: None, ..entry }.to_row().is_none());
        assert!(Entry { missing: false, ..entry }.to_row().is_some());
    }

    #[test]
    fn cached_rows_are_skipped() {
        let midnight = day().and_time(NaiveTime::MIN);
        let entries = (0..3).map(|hour| Entry {
            datetime: midnight + TimeDelta::hours(hour),
            consumption: Some(WattHours::from(100.0)),
            reversed: Some(WattHours::ZERO),
            missing: false,
        });
        let cached = BTreeSet::from([midnight]);
        let rows = new_rows(entries, &cached).collect::<Vec<_>>();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].datetime, midnight + TimeDelta::hours(1));
    }

    #[test]
    fn day_cache() {
        let midnight = day().and_time(NaiveTime::MIN);
        let mut cached = BTreeSet::from([midnight]);
        assert!(!is_day_cached(&cached, day()));
        cached.insert(midnight + TimeDelta::hours(23));
        assert!(is_day_cached(&cached, day()));
        assert!(!is_day_cached(&cached, day().succ_opt().unwrap()));
    }

    #[test]
    fn empty_credentials() {
        assert!(Api::try_new("shelly-77-eu.shelly.cloud", "", "key").is_err());
        assert!(Api::try_new("", "device", "key").is_err());
    }

    #[test]
    fn endpoint_url() -> Result {
        let api = Api::try_new("https://shelly-77-eu.shelly.cloud", " device ", "key")?;
        assert_eq!(
            api.url.as_str(),
            "https://shelly-77-eu.shelly.cloud/v2/statistics/power-consumption/em-3p",
        );
        assert_eq!(api.device_id, "device");
        Ok(())
    }
}
