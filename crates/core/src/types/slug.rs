//! URL slugs for catalog products.
//!
//! A product's slug is derived once from its name when the product is created
//! and must be unique across the catalog. Collisions are resolved by appending
//! `-1`, `-2`, ... to the base slug, so three products named "Fish Oil" end up
//! as `fish-oil`, `fish-oil-1` and `fish-oil-2` in creation order.

use core::fmt;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// A URL-safe product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum slug length (the column is `VARCHAR(50)`).
    pub const MAX_LENGTH: usize = 50;

    /// Base used when a name has no sluggable characters at all.
    pub const FALLBACK: &'static str = "product";

    /// Derive a base slug from a product name.
    ///
    /// The name is NFKD-decomposed first, so accented letters keep their
    /// base letter. ASCII letters and digits are lower-cased and kept, underscores are
    /// kept, runs of whitespace and hyphens collapse into one hyphen, and all
    /// other characters are dropped. Leading and trailing hyphens and
    /// underscores are trimmed and the result is cut to [`Self::MAX_LENGTH`].
    ///
    /// ```
    /// use wellcart_core::Slug;
    ///
    /// assert_eq!(Slug::slugify("  Omega-3  Fish Oil (1000mg)!").as_str(), "omega-3-fish-oil-1000mg");
    /// assert_eq!(Slug::slugify("Crème Brûlée Soap").as_str(), "creme-brulee-soap");
    /// assert_eq!(Slug::slugify("???").as_str(), "product");
    /// ```
    #[must_use]
    pub fn slugify(name: &str) -> Self {
        let mut out = String::with_capacity(name.len());
        let mut separator = false;

        for c in name.nfkd().filter(char::is_ascii) {
            if c.is_ascii_alphanumeric() || c == '_' {
                if separator && !out.is_empty() {
                    out.push('-');
                }
                separator = false;
                out.push(c.to_ascii_lowercase());
            } else if c == '-' || c.is_ascii_whitespace() {
                separator = true;
            }
        }

        Self::from_base(&out)
    }

    /// Accept an explicitly chosen slug as-is if it only contains
    /// `[A-Za-z0-9_-]` and fits in [`Self::MAX_LENGTH`].
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= Self::MAX_LENGTH
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| Self(raw.to_owned()))
    }

    /// Reconstruct a slug read back from storage without re-normalizing it.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    fn from_base(base: &str) -> Self {
        let trimmed = trim_edges(truncate(base, Self::MAX_LENGTH));
        if trimmed.is_empty() {
            Self(Self::FALLBACK.to_owned())
        } else {
            Self(trimmed.to_owned())
        }
    }

    /// The `n`-th collision candidate: `base-n`, with the base shortened so the
    /// whole slug still fits in [`Self::MAX_LENGTH`].
    #[must_use]
    pub fn with_suffix(&self, n: u32) -> Self {
        let suffix = format!("-{n}");
        let room = Self::MAX_LENGTH.saturating_sub(suffix.len());
        let base = trim_edges(truncate(&self.0, room));
        let base = if base.is_empty() { Self::FALLBACK } else { base };
        Self(format!("{base}{suffix}"))
    }

    /// Collision candidates in order: the slug itself, then `base-1`,
    /// `base-2`, ...
    pub fn candidates(&self) -> impl Iterator<Item = Self> + '_ {
        core::iter::once(self.clone()).chain((1..=u32::MAX).map(|n| self.with_suffix(n)))
    }

    /// The first candidate (see [`Slug::candidates`]) that is not taken.
    #[must_use]
    pub fn next_available(&self, taken: &HashSet<String>) -> Self {
        self.candidates()
            .find(|candidate| !taken.contains(&candidate.0))
            .unwrap_or_else(|| self.clone())
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the slug and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Cut `s` to at most `max` bytes. Slugs are ASCII so any byte index is a
/// character boundary.
fn truncate(s: &str, max: usize) -> &str {
    s.get(..max).unwrap_or(s)
}

fn trim_edges(s: &str) -> &str {
    s.trim_matches(|c| c == '-' || c == '_')
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
