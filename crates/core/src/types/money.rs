//! Fixed-point monetary amounts.
//!
//! All money in Heirloom flows through [`Money`], a thin wrapper around
//! `rust_decimal::Decimal`. Amounts are non-negative and carry at most two
//! fraction digits. Floats never touch a money path; prices configured by the
//! studio and every computed subtotal/credit/total stay exact.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Money`] value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is negative.
    #[error("money amount cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative USD amount with two fraction digits.
///
/// The studio sells in a single currency, so `Money` carries no currency
/// code. Construction rounds to cents (midpoint away from zero) and rejects
/// negative amounts; subtraction saturates at zero so a credit can never
/// drive a total negative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a `Money` from a decimal amount.
    ///
    /// The amount is rounded to two fraction digits.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(amount));
        }
        Ok(Self(round_cents(amount)))
    }

    /// Create a `Money` from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u64) -> Self {
        Self(Decimal::new(i64::try_from(cents).unwrap_or(i64::MAX), 2))
    }

    /// Create a `Money` from a whole number of dollars.
    #[must_use]
    pub const fn from_dollars(dollars: u32) -> Self {
        Self(Decimal::from_parts(dollars, 0, 0, false, 0))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount as a whole number of cents.
    ///
    /// Used at the payment gateway boundary, which charges in the smallest
    /// currency unit.
    #[must_use]
    pub fn as_cents(&self) -> u64 {
        use rust_decimal::prelude::ToPrimitive;
        (self.0 * Decimal::ONE_HUNDRED).round().to_u64().unwrap_or(0)
    }

    /// Whether this amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtract `other`, flooring at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }

    /// The smaller of two amounts.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if other.0 < self.0 { other } else { self }
    }
}

/// Round to two fraction digits, midpoint away from zero.
fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

// SQLx support (with postgres feature): stored as NUMERIC
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(round_cents(amount)))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_new_rejects_negative() {
        assert!(matches!(
            Money::new(dec!(-0.01)),
            Err(MoneyError::Negative(_))
        ));
        assert!(Money::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_new_rounds_to_cents() {
        let m = Money::new(dec!(10.005)).unwrap();
        assert_eq!(m.amount(), dec!(10.01));
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(Money::from_cents(774).amount(), dec!(7.74));
        assert_eq!(Money::from_cents(0), Money::ZERO);
    }

    #[test]
    fn test_from_dollars() {
        assert_eq!(Money::from_dollars(500).amount(), dec!(500));
    }

    #[test]
    fn test_as_cents() {
        assert_eq!(Money::from_dollars(274).as_cents(), 27400);
        assert_eq!(Money::from_cents(99).as_cents(), 99);
        assert_eq!(Money::ZERO.as_cents(), 0);
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let small = Money::from_dollars(80);
        let big = Money::from_dollars(1000);
        assert_eq!(small.saturating_sub(big), Money::ZERO);
        assert_eq!(big.saturating_sub(small), Money::from_dollars(920));
    }

    #[test]
    fn test_min() {
        let a = Money::from_dollars(50);
        let b = Money::from_dollars(80);
        assert_eq!(a.min(b), a);
        assert_eq!(b.min(a), a);
    }

    #[test]
    fn test_sum() {
        let total: Money = [
            Money::from_dollars(1),
            Money::from_cents(50),
            Money::from_cents(25),
        ]
        .into_iter()
        .sum();
        assert_eq!(total.amount(), dec!(1.75));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_dollars(274).to_string(), "$274.00");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
    }

    #[test]
    fn test_serde_transparent() {
        let m = Money::from_cents(1999);
        let json = serde_json::to_string(&m).unwrap();
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
