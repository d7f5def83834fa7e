use std::ops::Deref;

use chrono::NaiveDateTime;

use crate::quantity::energy::WattHours;

/// Metered energy over one time step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EnergySample {
    /// Local wall-clock time at the start of the step.
    pub timestamp: NaiveDateTime,

    pub consumed: WattHours,
    pub produced: WattHours,
}

/// Samples in ascending time order, one per timestamp.
#[derive(Clone, Debug, Default)]
pub struct EnergySeries(Vec<EnergySample>);

impl EnergySeries {
    /// Sort the samples and drop repeated timestamps, keeping the first occurrence.
    pub fn from_unsorted(mut samples: Vec<EnergySample>) -> Self {
        samples.sort_by_key(|sample| sample.timestamp);
        samples.dedup_by_key(|sample| sample.timestamp);
        Self(samples)
    }
}

impl Deref for EnergySeries {
    type Target = [EnergySample];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<EnergySample> for EnergySeries {
    fn from_iter<T: IntoIterator<Item = EnergySample>>(iter: T) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}
