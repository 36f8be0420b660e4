//! Core types for Wellcart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart_code;
pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod quantity;
pub mod slug;
pub mod status;

pub use cart_code::{CartCode, CartCodeError};
pub use category::{Category, CategoryError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use quantity::{Quantity, QuantityError, integer_from_json};
pub use slug::Slug;
pub use status::{TransactionStatus, TransactionStatusError};
