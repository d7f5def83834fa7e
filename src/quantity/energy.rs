use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use crate::quantity::{Quantity, cost::Cost, rate::KilowattHourRate};

pub type WattHours = Quantity<1, 1, 0>;

impl Display for WattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0} Wh", self.0)
    }
}

impl Debug for WattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}Wh", self.0)
    }
}

/// Rates are quoted per kilowatt-hour, hence the scaling.
impl Mul<KilowattHourRate> for WattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Self::Output {
        Cost::from(self.0 * 0.001 * rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_cost() {
        let cost = WattHours::from(2500.0) * KilowattHourRate::from(0.30);
        assert_abs_diff_eq!(cost.0, 0.75);
    }

    #[test]
    fn test_display() {
        assert_eq!(WattHours::from(1234.4).to_string(), "1234 Wh");
        assert_eq!(format!("{:?}", WattHours::from(1234.56)), "1234.6Wh");
    }
}
