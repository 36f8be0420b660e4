//! Wellcart Core - Shared domain types.
//!
//! This crate provides the types used across all Wellcart components:
//! - `storefront` - JSON API for the catalog, carts and customer accounts
//! - `cli` - Command-line tools for migrations, catalog and payment management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Validation rules that must hold regardless of transport
//! (slug generation, quantity parsing, price arithmetic) live here so they can
//! be tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, slugs, cart codes and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
