//! Product categories.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned for an unknown category code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category code: {0}")]
pub struct CategoryError(pub String);

/// The fixed set of catalog categories.
///
/// Stored and serialized by short code (`"SP"`, `"SC"`, `"HB"`, `"ETC"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Dietary supplements.
    #[serde(rename = "SP")]
    Supplement,
    /// Personal self-care products.
    #[serde(rename = "SC")]
    SelfCare,
    /// Health and beauty products.
    #[serde(rename = "HB")]
    HealthAndBeauty,
    /// Everything else.
    #[serde(rename = "ETC")]
    Others,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 4] = [
        Self::Supplement,
        Self::SelfCare,
        Self::HealthAndBeauty,
        Self::Others,
    ];

    /// Short code stored in the database.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Supplement => "SP",
            Self::SelfCare => "SC",
            Self::HealthAndBeauty => "HB",
            Self::Others => "ETC",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Supplement => "Supplement",
            Self::SelfCare => "Self Care",
            Self::HealthAndBeauty => "Health and Beauty",
            Self::Others => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    /// Parse a category from its code (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| CategoryError(code.to_owned()))
    }
}
