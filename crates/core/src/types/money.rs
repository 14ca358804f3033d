//! Currency amounts using decimal arithmetic.
//!
//! The store prices everything in South African rand. Amounts are kept as
//! [`Decimal`] so cart totals never pick up binary floating point error.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing [`Money`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount cannot be negative")]
    Negative,
    #[error("'{0}' is not a valid amount")]
    Invalid(String),
    #[error("amount is too large")]
    Overflow,
}

/// A non-negative currency amount.
///
/// Serialized as a decimal string (`"299.99"`), which the backend accepts for
/// every amount field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] for amounts below zero.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        Ok(Self(amount))
    }

    /// Build an amount from a whole number of cents.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] for negative input.
    pub fn from_cents(cents: i64) -> Result<Self, MoneyError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// Parse user or config input such as `"150"` or `"29.99"`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Invalid`] when the text is not a number and
    /// [`MoneyError::Negative`] for amounts below zero.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let trimmed = input.trim();
        let amount =
            Decimal::from_str(trimmed).map_err(|_| MoneyError::Invalid(trimmed.to_owned()))?;
        Self::new(amount)
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount rounded half-away-from-zero to two decimal places.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Unit price multiplied by a line quantity. Saturates at the largest
    /// representable amount; use [`Money::checked_times`] to detect that.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Unit price multiplied by a line quantity.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] when the product does not fit.
    pub fn checked_times(&self, quantity: u32) -> Result<Self, MoneyError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] when the sum does not fit.
    pub fn checked_add(&self, rhs: Self) -> Result<Self, MoneyError> {
        self.0.checked_add(rhs.0).map(Self).ok_or(MoneyError::Overflow)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{:.2}", self.rounded().0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_rand_with_two_decimals() {
        assert_eq!(Money::parse("150").unwrap().to_string(), "R150.00");
        assert_eq!(Money::from_cents(29_999).unwrap().to_string(), "R299.99");
        assert_eq!(Money::parse("0.005").unwrap().to_string(), "R0.01");
    }

    #[test]
    fn test_rejects_negative_and_garbage() {
        assert_eq!(Money::parse("-1"), Err(MoneyError::Negative));
        assert!(matches!(Money::parse("ten"), Err(MoneyError::Invalid(_))));
        assert!(Money::parse("-0").is_ok());
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Money::parse("29.99").unwrap();
        let total: Money = [unit.times(3), Money::parse("10").unwrap()]
            .into_iter()
            .sum();
        assert_eq!(total, Money::parse("99.97").unwrap());
    }

    #[test]
    fn test_overflow_is_reported_not_panicked() {
        let huge = Money::parse("79228162514264337593543950335").unwrap();
        assert_eq!(huge.checked_times(2), Err(MoneyError::Overflow));
        assert_eq!(huge.checked_add(Money::parse("1").unwrap()), Err(MoneyError::Overflow));
        assert_eq!(huge.times(2), huge);
        assert_eq!(huge + huge, huge);
        assert_eq!(huge.checked_times(1), Ok(huge));
    }

    #[test]
    fn test_serde_accepts_numbers_and_strings() {
        let from_number: Money = serde_json::from_str("299.99").unwrap();
        let from_string: Money = serde_json::from_str("\"299.99\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(serde_json::to_string(&from_string).unwrap(), "\"299.99\"");
        assert!(serde_json::from_str::<Money>("-5").is_err());
    }
}
