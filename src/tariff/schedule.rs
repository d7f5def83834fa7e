use chrono::{NaiveDateTime, Timelike};
use itertools::Itertools;

use crate::{
    prelude::*,
    quantity::rate::KilowattHourRate,
    tariff::{
        ConfigurationError,
        CoverageViolation,
        DayOfWeek,
        ScheduleError,
        TariffRule,
        TimeWindow,
        ViolationReason,
    },
};

#[derive(Copy, Clone, Debug)]
struct Band {
    start_hour: u32,
    end_hour: u32,
    rate: KilowattHourRate,
}

/// Validated tariff covering every hour of every weekday exactly once.
///
/// Rules are indexed per weekday into hour bands sorted by start hour.
#[must_use]
#[derive(Clone, Debug)]
pub struct TariffSchedule {
    bands: [Vec<Band>; 7],
}

impl TariffSchedule {
    /// Single rate around the clock.
    pub fn flat(rate: KilowattHourRate) -> Result<Self, ConfigurationError> {
        Ok(Self::index(&[TariffRule::try_new(TimeWindow::always(), rate)?]))
    }

    /// Build the schedule, or report every weekday the rules fail to tile.
    ///
    /// Without any rules, the default rate applies around the clock.
    #[instrument(skip_all)]
    pub fn try_new(
        rules: impl IntoIterator<Item = TariffRule>,
        default_rate: KilowattHourRate,
    ) -> Result<Self, ScheduleError> {
        let rules = rules.into_iter().collect_vec();
        if rules.is_empty() {
            debug!(?default_rate, "no tariff rules, using the flat rate");
            return Ok(Self::flat(default_rate)?);
        }

        let schedule = Self::index(&rules);
        let violations = DayOfWeek::all()
            .iter()
            .filter_map(|day| Self::find_violation(day, &schedule.bands[day.index()]))
            .collect_vec();
        if violations.is_empty() { Ok(schedule) } else { Err(ScheduleError::Coverage(violations)) }
    }

    fn index(rules: &[TariffRule]) -> Self {
        let mut bands: [Vec<Band>; 7] = std::array::from_fn(|_| Vec::new());
        for rule in rules {
            for day in rule.window.days() {
                bands[day.index()].push(Band {
                    start_hour: rule.window.start_hour(),
                    end_hour: rule.window.end_hour(),
                    rate: rule.rate,
                });
            }
        }
        for day_bands in &mut bands {
            day_bands.sort_by_key(|band| (band.start_hour, band.end_hour));
        }
        Self { bands }
    }

    /// Walk the sorted bands and return the first hour that is not covered exactly once.
    fn find_violation(day: DayOfWeek, bands: &[Band]) -> Option<CoverageViolation> {
        let mut covered_until = 0;
        for band in bands {
            if band.start_hour > covered_until {
                return Some(CoverageViolation {
                    day,
                    hour: covered_until,
                    reason: ViolationReason::Gap,
                });
            }
            if band.start_hour < covered_until {
                return Some(CoverageViolation {
                    day,
                    hour: band.start_hour,
                    reason: ViolationReason::Overlap,
                });
            }
            covered_until = band.end_hour;
        }
        (covered_until < 24).then_some(CoverageViolation {
            day,
            hour: covered_until,
            reason: ViolationReason::Gap,
        })
    }

    /// Buy rate for the weekday and hour.
    ///
    /// # Panics
    ///
    /// Hour must be within `0..24`.
    pub fn rate_at(&self, day: DayOfWeek, hour: u32) -> KilowattHourRate {
        assert!(hour < 24, "hour {hour} is out of range");
        let bands = &self.bands[day.index()];
        let position = bands.partition_point(|band| band.end_hour <= hour);
        bands[position].rate
    }

    pub fn rate_on(&self, timestamp: NaiveDateTime) -> KilowattHourRate {
        self.rate_at(DayOfWeek::of(timestamp), timestamp.hour())
    }
}
