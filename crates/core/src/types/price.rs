//! Catalog prices using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(10, 2)`: at most ten digits, exactly two of
//! them after the decimal point. Cart totals are computed from prices on every
//! read and may exceed that range, so they are plain [`Decimal`] values.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Quantity;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount has more than two decimal places.
    #[error("price must have at most {max} decimal places")]
    TooPrecise {
        /// Maximum allowed decimal places.
        max: u32,
    },
    /// The amount does not fit in ten digits.
    #[error("price must be less than 100000000")]
    TooLarge,
    /// The input is not a decimal number.
    #[error("price is not a valid decimal number")]
    Invalid,
}

/// A non-negative catalog price with exactly two decimal places.
///
/// Serializes as a decimal string (`"12.50"`), matching how the API has
/// always exposed prices to clients.
///
/// ```
/// use wellcart_core::{Price, Quantity};
///
/// let price: Price = "4.5".parse().unwrap();
/// assert_eq!(price.to_string(), "4.50");
/// assert_eq!(price.line_total(Quantity::new(3).unwrap()).to_string(), "13.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Number of decimal places every price carries.
    pub const SCALE: u32 = 2;

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, has more than two decimal
    /// places, or needs more than ten digits.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        let normalized = amount.normalize();
        if normalized.scale() > Self::SCALE {
            return Err(PriceError::TooPrecise { max: Self::SCALE });
        }

        if normalized >= Decimal::from(100_000_000) {
            return Err(PriceError::TooLarge);
        }

        let mut amount = normalized;
        amount.rescale(Self::SCALE);
        Ok(Self(amount))
    }

    /// Returns the amount as a decimal with two decimal places.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Total for `quantity` units at this price.
    #[must_use]
    pub fn line_total(&self, quantity: Quantity) -> Decimal {
        self.0 * Decimal::from(quantity.get())
    }

    /// Sum a sequence of line totals, yielding `0.00` for an empty sequence.
    pub fn sum<I>(totals: I) -> Decimal
    where
        I: IntoIterator<Item = Decimal>,
    {
        totals
            .into_iter()
            .fold(Decimal::new(0, Self::SCALE), |acc, total| acc + total)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid)?;
        Self::new(amount)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[test]
    fn test_new_rescales_to_two_places() {
        let price = Price::new(Decimal::new(5, 0)).unwrap();
        assert_eq!(price.to_string(), "5.00");

        let price = Price::new(Decimal::new(12_500, 3)).unwrap();
        assert_eq!(price.to_string(), "12.50");
    }

    #[test]
    fn test_new_rejects_invalid_amounts() {
        assert_eq!(Price::new(Decimal::new(-1, 2)), Err(PriceError::Negative));
        assert_eq!(
            Price::new(Decimal::new(1_001, 3)),
            Err(PriceError::TooPrecise { max: 2 })
        );
        assert_eq!(
            Price::new(Decimal::from(100_000_000)),
            Err(PriceError::TooLarge)
        );
        assert_eq!("abc".parse::<Price>(), Err(PriceError::Invalid));
    }

    #[test]
    fn test_zero_is_allowed() {
        assert_eq!("0".parse::<Price>().unwrap().to_string(), "0.00");
    }

    #[test]
    fn test_line_total_and_sum() {
        let a: Price = "19.99".parse().unwrap();
        let b: Price = "0.50".parse().unwrap();

        let totals = [a.line_total(qty(2)), b.line_total(qty(3))];
        assert_eq!(totals[0].to_string(), "39.98");
        assert_eq!(Price::sum(totals).to_string(), "41.48");
    }

    #[test]
    fn test_sum_of_nothing_is_zero_with_scale() {
        assert_eq!(Price::sum(Vec::new()).to_string(), "0.00");
    }

    #[test]
    fn test_serializes_as_string() {
        let price: Price = "7.5".parse().unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"7.50\"");

        let parsed: Price = serde_json::from_str("\"3.25\"").unwrap();
        assert_eq!(parsed.to_string(), "3.25");
    }
}
