use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Monetary amount, kept at two decimal places.
///
/// The engine is single-currency; whatever currency the surrounding
/// application tracks, every amount that enters the core goes through
/// [`Money::new`] and is rounded once, so later arithmetic never
/// accumulates sub-cent noise.
#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Default, Serialize, Deserialize,
)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    #[must_use]
    pub fn new(value: Decimal) -> Self {
        Self(value.round_dp(2))
    }

    #[must_use]
    pub fn value(&self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} €", &self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

/// Share of a whole, stored as a value between 0 and 100 at two decimal
/// places.
#[derive(Debug, PartialEq, Eq, PartialOrd, Hash, Copy, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(Decimal);

impl Percentage {
    pub const ZERO: Percentage = Percentage(Decimal::ZERO);
    pub const ONE_HUNDRED: Percentage = Percentage(Decimal::ONE_HUNDRED);

    #[must_use]
    pub fn from_int(v: i64) -> Self {
        Percentage(Decimal::new(v, 0))
    }

    /// Which percentage of `whole` is `part`.
    ///
    /// # Panics
    /// On a zero `whole`; callers guard the division.
    #[must_use]
    pub fn of(part: Decimal, whole: Decimal) -> Self {
        Percentage((part / whole * dec!(100)).round_dp(2))
    }

    #[must_use]
    pub fn apply_to(&self, d: Decimal) -> Decimal {
        self.0 / dec!(100) * d
    }

    /// The percentage as a 0..=1 factor.
    #[must_use]
    pub fn as_factor(&self) -> Decimal {
        self.0 / dec!(100)
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", &self.0)
    }
}
