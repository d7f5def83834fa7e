//! Time-of-use buy prices keyed by weekday and hour.

mod day;
mod error;
mod rule;
mod schedule;
mod window;

pub use self::{
    day::DayOfWeek,
    error::{ConfigurationError, CoverageViolation, ScheduleError, ViolationReason},
    rule::TariffRule,
    schedule::TariffSchedule,
    window::TimeWindow,
};
