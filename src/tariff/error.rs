use std::fmt::{Display, Formatter};

use itertools::Itertools;
use thiserror::Error;

use crate::tariff::DayOfWeek;

/// Invalid tariff rule or time window.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("day number {0} is out of range, expected 1 (Monday) to 7 (Sunday)")]
    InvalidDay(u32),

    #[error("time window needs at least one day")]
    NoDays,

    #[error("start hour {0} is out of range, expected 0 to 23")]
    InvalidStartHour(u32),

    #[error("end hour {0} is out of range, expected 1 to 24")]
    InvalidEndHour(u32),

    #[error("start hour {start_hour} must be before end hour {end_hour}")]
    EmptyWindow { start_hour: u32, end_hour: u32 },

    #[error("rate {0} must be a non-negative finite number")]
    InvalidRate(f64),

    #[error("malformed tariff rule `{input}`: {reason}")]
    Malformed { input: String, reason: &'static str },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ViolationReason {
    /// No rule covers the hour.
    Gap,

    /// More than one rule covers the hour.
    Overlap,
}

/// First hour of a weekday at which the rules do not tile the day.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CoverageViolation {
    pub day: DayOfWeek,
    pub hour: u32,
    pub reason: ViolationReason,
}

impl Display for CoverageViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let reason = match self.reason {
            ViolationReason::Gap => "gap",
            ViolationReason::Overlap => "overlap",
        };
        write!(f, "{reason} on {} at {:02}:00", self.day, self.hour)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The rules do not cover every hour of every weekday exactly once.
    #[error("tariff rules do not cover the week exactly once: {}", .0.iter().join(", "))]
    Coverage(Vec<CoverageViolation>),
}
