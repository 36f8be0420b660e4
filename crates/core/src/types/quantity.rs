//! Cart item quantities.

use core::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors that can occur when parsing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// The value is not an integer (or an integer string).
    #[error("quantity must be an integer")]
    NotInteger,
    /// The value is zero or negative.
    #[error("quantity must be a positive integer")]
    NotPositive,
    /// The value does not fit the database column.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Largest accepted quantity.
        max: u32,
    },
}

/// A strictly positive number of units of a product in a cart.
///
/// Stored in an `INTEGER` column with a `CHECK (quantity > 0)` constraint, so
/// values are capped at `i32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// Largest storable quantity.
    #[allow(clippy::cast_sign_loss)] // i32::MAX is positive
    pub const MAX: u32 = i32::MAX as u32;

    /// Create a quantity from a positive count.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` for zero and
    /// `QuantityError::TooLarge` above `i32::MAX`.
    pub fn new(n: u32) -> Result<Self, QuantityError> {
        if n > Self::MAX {
            return Err(QuantityError::TooLarge { max: Self::MAX });
        }
        NonZeroU32::new(n).map(Self).ok_or(QuantityError::NotPositive)
    }

    /// Create a quantity from a signed integer, rejecting zero and negatives.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` for values `<= 0` and
    /// `QuantityError::TooLarge` above `i32::MAX`.
    pub fn from_i64(n: i64) -> Result<Self, QuantityError> {
        if n <= 0 {
            return Err(QuantityError::NotPositive);
        }
        let n = u32::try_from(n).map_err(|_| QuantityError::TooLarge { max: Self::MAX })?;
        Self::new(n)
    }

    /// Parse a quantity from a loosely-typed JSON value.
    ///
    /// Clients send quantities as numbers or as numeric strings, so this
    /// accepts integers, floats without a fractional part, and strings that
    /// parse as integers after trimming.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotInteger` for anything that is not an
    /// integer, then the errors of [`Quantity::from_i64`].
    pub fn from_json(value: &Value) -> Result<Self, QuantityError> {
        Self::from_i64(integer_from_json(value).ok_or(QuantityError::NotInteger)?)
    }

    /// Returns the count as a `u32`.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0.get()
    }

    /// Returns the count as the `i32` stored in the database.
    #[must_use]
    pub fn as_i32(&self) -> i32 {
        i32::try_from(self.0.get()).unwrap_or(i32::MAX)
    }
}

/// Extract an integer from a JSON number or numeric string.
///
/// Floats are accepted only when they have no fractional part; booleans,
/// nulls, arrays and objects are rejected.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // floats are bounded before the cast
pub fn integer_from_json(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        Self::from_i64(n)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(n: i32) -> Result<Self, Self::Error> {
        Self::from_i64(i64::from(n))
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.get()
    }
}
