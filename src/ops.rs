use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

use serde::{Serialize, Serializer};

use crate::prelude::*;

/// Inclusive range, written as `min..max` on the command line and in manifests.
#[must_use]
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct RangeInclusive<T: Copy> {
    pub min: T,
    pub max: T,
}

impl<T: Copy> RangeInclusive<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: Copy + PartialOrd> RangeInclusive<T> {
    #[must_use]
    pub fn contains(self, other: T) -> bool {
        (self.min <= other) && (other <= self.max)
    }
}

impl<T: Copy + Display> Display for RangeInclusive<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

impl<T: Copy + Display> Debug for RangeInclusive<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl<T: Copy + Display> Serialize for RangeInclusive<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<T> FromStr for RangeInclusive<T>
where
    T: Copy + PartialOrd + Display + FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let (min, max) =
            input.split_once("..").with_context(|| format!("`{input}` is not a `min..max` range"))?;
        let min = min.trim().parse().with_context(|| format!("invalid minimum in `{input}`"))?;
        let max = max.trim().parse().with_context(|| format!("invalid maximum in `{input}`"))?;
        ensure!(min <= max, "the minimum must not exceed the maximum in `{input}`");
        Ok(Self { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ok() -> Result {
        assert_eq!("500..1500".parse::<RangeInclusive<u32>>()?, RangeInclusive::new(500, 1500));
        assert_eq!("8 .. 16".parse::<RangeInclusive<u32>>()?, RangeInclusive::new(8, 16));
        Ok(())
    }

    #[test]
    fn parse_errors() {
        assert!("500".parse::<RangeInclusive<u32>>().is_err());
        assert!("1500..500".parse::<RangeInclusive<u32>>().is_err());
        assert!("a..b".parse::<RangeInclusive<f64>>().is_err());
    }

    #[test]
    fn display() {
        assert_eq!(RangeInclusive::new(2000.0, 4500.5).to_string(), "2000..4500.5");
    }

    #[test]
    fn contains() {
        let range = RangeInclusive::new(6, 20);
        assert!(range.contains(6));
        assert!(range.contains(20));
        assert!(!range.contains(21));
    }
}
