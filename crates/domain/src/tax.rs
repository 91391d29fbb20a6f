//! Tax slab percentages.

use serde::{Deserialize, Serialize};

use crate::money::Money;

const BASIS_POINTS_PER_PERCENT: u32 = 100;
const BASIS_POINTS_WHOLE: i128 = 10_000;

/// A tax rate stored in basis points (1/100th of a percent).
///
/// Whole-percent slabs such as 5% or 18% map to 500 and 1800; fractional
/// slabs like 2.5% map to 250 without losing precision.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a rate from a whole percentage.
    pub fn from_percent(percent: u32) -> Self {
        Self(percent * BASIS_POINTS_PER_PERCENT)
    }

    /// Creates a rate from basis points.
    pub fn from_basis_points(basis_points: u32) -> Self {
        Self(basis_points)
    }

    /// Returns the rate in basis points.
    pub fn basis_points(&self) -> u32 {
        self.0
    }

    /// Computes the tax owed on `amount`, rounding half away from zero to the
    /// nearest minor unit. Returns `None` when the tax does not fit in
    /// [`Money`].
    pub fn tax_on(&self, amount: Money) -> Option<Money> {
        let scaled = i128::from(amount.minor()) * i128::from(self.0);
        let half = BASIS_POINTS_WHOLE / 2;
        let rounded = if scaled >= 0 {
            (scaled + half) / BASIS_POINTS_WHOLE
        } else {
            (scaled - half) / BASIS_POINTS_WHOLE
        };
        i64::try_from(rounded).ok().map(Money::from_minor)
    }
}

impl std::fmt::Display for TaxRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / BASIS_POINTS_PER_PERCENT;
        let frac = self.0 % BASIS_POINTS_PER_PERCENT;
        if frac == 0 {
            write!(f, "{whole}%")
        } else if frac % 10 == 0 {
            write!(f, "{whole}.{}%", frac / 10)
        } else {
            write!(f, "{whole}.{frac:02}%")
        }
    }
}
