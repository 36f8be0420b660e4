//! Business logic services for the storefront.
//!
//! Cart and catalog operations are thin enough to live in the repositories;
//! accounts get a service layer for form validation and password hashing.

pub mod auth;
