//! Value objects for the order domain.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a user owned by the identity service.
///
/// Opaque to this service; only guaranteed to be non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a user ID, returning `None` when the input is blank.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// Returns the user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a product owned by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a product ID, returning `None` when the input is blank.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Error returned when a decimal amount cannot be represented as [`Money`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("invalid decimal amount '{0}'")]
    Invalid(String),

    #[error("decimal amount '{0}' is out of range")]
    OutOfRange(String),
}

/// Largest absolute amount that fits the `NUMERIC(14, 2)` money columns.
pub const MAX_AMOUNT_CENTS: i64 = 99_999_999_999_999;

/// Fixed-point amount with two fractional digits.
///
/// Parsed from and serialized to decimal text (`"15.00"`) so that prices never
/// pass through floating point. Extra fractional digits are rounded half away
/// from zero at the cent. Every value lies within [`MAX_AMOUNT_CENTS`], so
/// arithmetic is checked and returns `None` instead of leaving that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Money(Decimal);

impl Money {
    /// Creates a Money amount, rounding to the cent.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if rounded.abs() > Self::max_amount() {
            return Err(MoneyError::OutOfRange(amount.to_string()));
        }
        rounded.rescale(2);
        Ok(Self(rounded))
    }

    /// Creates a Money amount from cents.
    pub fn from_cents(cents: i32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(Decimal::new(0, 2))
    }

    /// Returns the amount as a decimal.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiplies by a quantity, or `None` when the product is out of range.
    pub fn checked_mul(&self, quantity: u32) -> Option<Money> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .and_then(|amount| Self::new(amount).ok())
    }

    /// Adds two amounts, or `None` when the sum is out of range.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0
            .checked_add(other.0)
            .and_then(|amount| Self::new(amount).ok())
    }

    fn max_amount() -> Decimal {
        Decimal::new(MAX_AMOUNT_CENTS, 2)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        // Plain decimal text only: no digit separators, no exponents.
        if raw.is_empty()
            || !raw
                .bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+'))
        {
            return Err(MoneyError::Invalid(raw.to_string()));
        }

        let amount = Decimal::from_str(raw).map_err(|e| match e {
            rust_decimal::Error::ExceedsMaximumPossibleValue
            | rust_decimal::Error::LessThanMinimumPossibleValue => {
                MoneyError::OutOfRange(raw.to_string())
            }
            _ => MoneyError::Invalid(raw.to_string()),
        })?;

        Self::new(amount).map_err(|_| MoneyError::OutOfRange(raw.to_string()))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Money> for String {
    fn from(money: Money) -> Self {
        money.to_string()
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
