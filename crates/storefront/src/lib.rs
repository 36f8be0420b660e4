//! Wellcart Storefront library.
//!
//! The JSON API for the catalog, carts and customer accounts, exposed as a
//! library so the binary, the CLI and the integration tests share one
//! implementation of the repositories and routes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
