//! Client-supplied cart codes.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors that can occur when parsing a [`CartCode`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartCodeError {
    /// The code is empty or whitespace.
    #[error("cart_code cannot be blank")]
    Blank,
    /// The code is longer than the column allows.
    #[error("cart_code must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The JSON value is neither a string nor a number.
    #[error("cart_code must be a string")]
    NotAString,
}

/// Opaque identifier a client generates to correlate requests with a cart.
///
/// The server never interprets the code; it only looks carts up by it and
/// creates a cart the first time an unknown code adds an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartCode(String);

impl CartCode {
    /// Maximum code length (the column is `VARCHAR(50)`).
    pub const MAX_LENGTH: usize = 50;

    /// Parse a cart code, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `CartCodeError::Blank` for an empty code and
    /// `CartCodeError::TooLong` above 50 characters.
    pub fn parse(s: &str) -> Result<Self, CartCodeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CartCodeError::Blank);
        }
        if s.chars().count() > Self::MAX_LENGTH {
            return Err(CartCodeError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Parse a cart code from a JSON body value.
    ///
    /// Numeric codes are accepted and used in their decimal form.
    ///
    /// # Errors
    ///
    /// Returns `CartCodeError::NotAString` for other JSON types, then the
    /// errors of [`CartCode::parse`].
    pub fn from_json(value: &Value) -> Result<Self, CartCodeError> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => Self::parse(&n.to_string()),
            _ => Err(CartCodeError::NotAString),
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CartCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
