//! Tabular files: metered input, simulation output, and the metering cache.

use std::{
    collections::BTreeSet,
    fs::{File, OpenOptions},
    io::{Read, Write},
    path::Path,
};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{
    core::sample::{EnergySample, EnergySeries},
    prelude::*,
    quantity::energy::WattHours,
    timestamp::MeterTimestamp,
};

/// Single row of the metering file.
#[serde_as]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeterRow {
    #[serde_as(as = "MeterTimestamp")]
    pub datetime: NaiveDateTime,

    /// Energy drawn from the grid.
    pub consumption: WattHours,

    /// Energy returned to the grid, that is the surplus production.
    #[serde(alias = "produced")]
    pub reversed: WattHours,
}

impl TryFrom<MeterRow> for EnergySample {
    type Error = Error;

    fn try_from(row: MeterRow) -> Result<Self> {
        for (name, energy) in [("consumption", row.consumption), ("reversed", row.reversed)] {
            ensure!(
                energy.is_finite() && !energy.is_sign_negative(),
                "invalid {name} at {}: {energy:?}",
                row.datetime,
            );
        }
        Ok(Self { timestamp: row.datetime, consumed: row.consumption, produced: row.reversed })
    }
}

/// Read the metering file into a sorted series without repeated timestamps.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_series(path: &Path) -> Result<EnergySeries> {
    let file = File::open(path).with_context(|| format!("cannot read input `{}`", path.display()))?;
    read_series_from(file).with_context(|| format!("cannot read input `{}`", path.display()))
}

pub fn read_series_from(reader: impl Read) -> Result<EnergySeries> {
    let samples = csv::Reader::from_reader(reader)
        .deserialize::<MeterRow>()
        .enumerate()
        .map(|(index, row)| {
            // Rows are numbered as in a spreadsheet, the header being the first one.
            let row = row.with_context(|| format!("malformed row #{}", index + 2))?;
            EnergySample::try_from(row)
        })
        .collect::<Result<Vec<_>>>()?;
    let n_rows = samples.len();
    let series = EnergySeries::from_unsorted(samples);
    if series.len() != n_rows {
        warn!(n_duplicates = n_rows - series.len(), "dropped repeated timestamps");
    }
    info!(n_samples = series.len(), "loaded");
    Ok(series)
}

/// Write the rows with a header, replacing the file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result {
    let file = File::create(path).with_context(|| format!("cannot write `{}`", path.display()))?;
    let n_rows = write_rows_to(file, true, rows)
        .with_context(|| format!("cannot write `{}`", path.display()))?;
    info!(n_rows, "written");
    Ok(())
}

/// Append the rows, writing the header only if the file is empty.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn append_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<usize> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open `{}` for appending", path.display()))?;
    let is_empty = file.metadata()?.len() == 0;
    write_rows_to(file, is_empty, rows).with_context(|| format!("cannot write `{}`", path.display()))
}

fn write_rows_to<T: Serialize>(
    writer: impl Write,
    has_headers: bool,
    rows: impl IntoIterator<Item = T>,
) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new().has_headers(has_headers).from_writer(writer);
    let mut n_rows = 0;
    for row in rows {
        writer.serialize(row)?;
        n_rows += 1;
    }
    writer.flush()?;
    Ok(n_rows)
}

/// Timestamps already present in the metering file, empty if there is no file yet.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_timestamps(path: &Path) -> Result<BTreeSet<NaiveDateTime>> {
    if !path.try_exists()? || path.metadata()?.len() == 0 {
        return Ok(BTreeSet::new());
    }
    let series = read_series(path)?;
    Ok(series.iter().map(|sample| sample.timestamp).collect())
}

/// Make sure the output file can be written, creating the parent directory if needed.
pub fn ensure_writable(path: &Path) -> Result {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        info!(path = %parent.display(), "creating the output directory…");
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory `{}`", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("output `{}` is not writable", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn read_sorted_and_deduplicated() -> Result {
        let input = "\
datetime,consumption,reversed,missing
2025-01-01 01:00:00,100.5,0,false
2025-01-01 00:00:00,200,10,false
2025-01-01T01:00:00,999,999,false
";
        let series = read_series_from(input.as_bytes())?;
        assert_eq!(series.len(), 2);
        assert_eq!(
            series[0].timestamp,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        );
        assert_abs_diff_eq!(series[0].produced.0, 10.0);
        assert_abs_diff_eq!(series[1].consumed.0, 100.5);
        Ok(())
    }

    #[test]
    fn produced_alias() -> Result {
        let input = "datetime,consumption,produced\n2025-01-01 00:00:00,1,2\n";
        let series = read_series_from(input.as_bytes())?;
        assert_abs_diff_eq!(series[0].produced.0, 2.0);
        Ok(())
    }

    #[test]
    fn negative_energy() {
        let input = "datetime,consumption,reversed\n2025-01-01 00:00:00,-1,0\n";
        assert!(read_series_from(input.as_bytes()).is_err());
    }

    #[test]
    fn malformed_row() {
        let input = "datetime,consumption,reversed\nnot a date,1,0\n";
        let error = read_series_from(input.as_bytes()).unwrap_err();
        assert!(format!("{error:#}").contains("row #2"));
    }

    #[test]
    fn header_written_once() -> Result {
        let row = MeterRow {
            datetime: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            consumption: WattHours::from(1.0),
            reversed: WattHours::ZERO,
        };
        let mut buffer = Vec::new();
        write_rows_to(&mut buffer, true, [row])?;
        write_rows_to(&mut buffer, false, [row])?;
        assert_eq!(
            String::from_utf8(buffer)?,
            "datetime,consumption,reversed\n2025-01-01 00:00:00,1.0,0.0\n2025-01-01 00:00:00,1.0,0.0\n",
        );
        Ok(())
    }
}
