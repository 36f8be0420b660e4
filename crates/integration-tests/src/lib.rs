//! Integration test helpers for Wellcart.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the API
//! cargo run -p wellcart-cli -- migrate
//! cargo run -p wellcart-storefront
//!
//! # Run the ignored integration tests against it
//! cargo test -p wellcart-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `WELLCART_TEST_BASE_URL` - Storefront base URL (default: `http://localhost:8000`)
//! - `WELLCART_DATABASE_URL` - Database the server uses, for seeding products
//!   and resolving payments (falls back to `DATABASE_URL`)
//!
//! Tests create their own products, users and cart codes with unique names so
//! they can run repeatedly against the same database.

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use reqwest::Client;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

use wellcart_core::{Category, Price};
use wellcart_storefront::db::{self, ProductRepository};
use wellcart_storefront::models::{NewProduct, Product};

/// Password accepted by the registration password rules.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Base URL for the storefront API.
#[must_use]
pub fn base_url() -> String {
    std::env::var("WELLCART_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// An HTTP client that keeps the session cookie between requests.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Connect to the database the server under test uses.
pub async fn pool() -> PgPool {
    let url = std::env::var("WELLCART_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("WELLCART_DATABASE_URL must be set for integration tests");

    db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database")
}

/// A short random suffix for names that must be unique per run.
#[must_use]
pub fn unique(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &id[..12])
}

/// A fresh client-side cart code.
#[must_use]
pub fn cart_code() -> String {
    Uuid::new_v4().to_string()
}

/// Insert a product directly through the repository.
pub async fn seed_product(pool: &PgPool, name: &str, price: &str, category: Category) -> Product {
    let price: Price = price.parse().expect("valid test price");

    ProductRepository::new(pool)
        .create(&NewProduct {
            name: name.to_owned(),
            price,
            category: Some(category),
            description: Some(format!("{name} for integration tests")),
            image: String::new(),
            slug: None,
        })
        .await
        .expect("Failed to seed product")
}

/// Add a product to a cart over HTTP and return the response body.
pub async fn add_to_cart(client: &Client, code: &str, product: &Product, quantity: i64) -> Value {
    let resp = client
        .post(format!("{}/cart/add/", base_url()))
        .json(&json!({
            "cart_code": code,
            "product_id": product.id.as_i32(),
            "quantity": quantity,
        }))
        .send()
        .await
        .expect("Failed to add to cart");

    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    resp.json().await.expect("Failed to parse cart item")
}

/// Register a user with a unique username and return the username.
pub async fn register_user(client: &Client) -> String {
    let username = unique("user_");
    let resp = client
        .post(format!("{}/register/", base_url()))
        .json(&json!({
            "username": username,
            "password": TEST_PASSWORD,
            "password2": TEST_PASSWORD,
            "email": format!("{username}@example.com"),
        }))
        .send()
        .await
        .expect("Failed to register");

    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    username
}
