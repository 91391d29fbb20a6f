//! Money value object.

use serde::{Deserialize, Serialize};

/// Money amount held in currency minor units (paise) to avoid floating point.
///
/// `Money::from_minor(4000)` is ₹40.00.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a new amount from minor units.
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in minor units.
    pub fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole major-unit portion.
    pub fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit remainder after the major portion.
    pub fn minor_part(&self) -> i64 {
        self.0.abs() % 100
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    pub fn checked_multiply(&self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(quantity)).map(Self)
    }

    /// Multiplies by a quantity, clamping at the representable bounds.
    pub fn saturating_multiply(&self, quantity: u32) -> Money {
        Self(self.0.saturating_mul(i64::from(quantity)))
    }

    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_add(&self, other: Money) -> Money {
        Self(self.0.saturating_add(other.0))
    }

    /// Reduces the amount by a whole percentage, flooring the discount.
    ///
    /// Percentages above 100 are clamped so the result never goes negative.
    pub fn discounted_by(&self, percent: u8) -> Money {
        let discount = i128::from(self.0) * i128::from(percent.min(100)) / 100;
        // |discount| <= |self.0|, so the cast is lossless.
        Self(self.0 - discount as i64)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 < 0 {
            write!(f, "-₹{}.{:02}", self.major().abs(), self.minor_part())
        } else {
            write!(f, "₹{}.{:02}", self.major(), self.minor_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}
