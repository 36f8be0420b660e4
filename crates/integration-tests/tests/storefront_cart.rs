//! Integration tests for the cart API.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`wellcart migrate`)
//! - The storefront server running (cargo run -p wellcart-storefront)
//! - `WELLCART_DATABASE_URL` pointing at the server's database
//!
//! Run with: cargo test -p wellcart-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use wellcart_core::Category;
use wellcart_integration_tests::{
    add_to_cart, base_url, cart_code, client, pool, seed_product, unique,
};
use wellcart_storefront::models::Product;

async fn in_cart(client: &reqwest::Client, code: &str, product: &Product) -> bool {
    let resp = client
        .get(format!(
            "{}/cart/in-cart/?cart_code={code}&product_id={}",
            base_url(),
            product.id
        ))
        .send()
        .await
        .expect("Failed to query in-cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse body");
    body["product_in_cart"].as_bool().expect("boolean flag")
}

// ============================================================================
// Add
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_add_creates_cart_implicitly() {
    let pool = pool().await;
    let product = seed_product(&pool, &unique("Cart Vitamin "), "12.50", Category::Supplement).await;
    let client = client();
    let code = cart_code();

    let body = add_to_cart(&client, &code, &product, 2).await;

    assert_eq!(body["message"], "Cart item added successfully");
    assert_eq!(body["data"]["quantity"], 2);
    assert_eq!(body["data"]["product"]["id"], product.id.as_i32());
    assert_eq!(body["data"]["total"], "25.00");
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_add_same_product_overwrites_quantity() {
    let pool = pool().await;
    let product = seed_product(&pool, &unique("Overwrite Zinc "), "4.00", Category::Supplement).await;
    let client = client();
    let code = cart_code();

    let first = add_to_cart(&client, &code, &product, 3).await;
    let second = add_to_cart(&client, &code, &product, 5).await;

    assert_eq!(second["message"], "Cart item updated successfully");
    assert_eq!(first["data"]["id"], second["data"]["id"]);
    assert_eq!(second["data"]["quantity"], 5);

    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM shop.cart_item ci JOIN shop.cart c ON c.id = ci.cart_id \
         WHERE c.cart_code = $1",
    )
    .bind(&code)
    .fetch_one(&pool)
    .await
    .expect("Failed to count cart items");
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_add_rejects_non_positive_quantities() {
    let client = client();

    for quantity in [json!(0), json!(-3)] {
        let resp = client
            .post(format!("{}/cart/add/", base_url()))
            .json(&json!({"cart_code": cart_code(), "product_id": 1, "quantity": quantity}))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.expect("Failed to parse body");
        assert_eq!(body["error"], "Quantity must be a positive integer.");
    }
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_add_unknown_product_is_not_found() {
    let resp = client()
        .post(format!("{}/cart/add", base_url()))
        .json(&json!({"cart_code": cart_code(), "product_id": i32::MAX, "quantity": 1}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Update, In-Cart & Delete
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_update_quantity() {
    let pool = pool().await;
    let product = seed_product(&pool, &unique("Update Serum "), "7.25", Category::SelfCare).await;
    let client = client();
    let added = add_to_cart(&client, &cart_code(), &product, 1).await;

    let resp = client
        .patch(format!("{}/cart/update-quantity/", base_url()))
        .json(&json!({"item_id": added["data"]["id"], "quantity": "4"}))
        .send()
        .await
        .expect("Failed to update quantity");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["message"], "Cart item updated successfully.");
    assert_eq!(body["data"]["quantity"], 4);
    assert_eq!(body["data"]["total"], "29.00");

    let resp = client
        .patch(format!("{}/cart/update-quantity/", base_url()))
        .json(&json!({"item_id": added["data"]["id"], "quantity": 0}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_in_cart_and_delete() {
    let pool = pool().await;
    let product = seed_product(&pool, &unique("Delete Balm "), "3.00", Category::HealthAndBeauty).await;
    let client = client();
    let code = cart_code();
    add_to_cart(&client, &code, &product, 1).await;

    assert!(in_cart(&client, &code, &product).await);

    let delete_url = format!(
        "{}/cart/delete/?cart_code={code}&product_id={}",
        base_url(),
        product.id
    );
    let resp = client.delete(&delete_url).send().await.expect("Failed to delete");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["message"], "Cart item deleted successfully.");

    assert!(!in_cart(&client, &code, &product).await);

    let resp = client.delete(&delete_url).send().await.expect("Failed to delete");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["error"], "Cart item not found.");
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_in_cart_unknown_cart_or_product_is_not_found() {
    let pool = pool().await;
    let product = seed_product(&pool, &unique("Lookup Gel "), "1.50", Category::SelfCare).await;
    let client = client();

    let resp = client
        .get(format!(
            "{}/cart/in-cart/?cart_code={}&product_id={}",
            base_url(),
            cart_code(),
            product.id
        ))
        .send()
        .await
        .expect("Failed to query in-cart");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["error"], "Cart not found.");

    let code = cart_code();
    add_to_cart(&client, &code, &product, 1).await;
    let resp = client
        .get(format!(
            "{}/cart/in-cart/?cart_code={code}&product_id={}",
            base_url(),
            i32::MAX
        ))
        .send()
        .await
        .expect("Failed to query in-cart");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["error"], "Product not found.");
}

// ============================================================================
// Paid Cart Views
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_unpaid_cart_is_not_found() {
    let pool = pool().await;
    let product = seed_product(&pool, &unique("Unpaid Tea "), "2.00", Category::Others).await;
    let client = client();
    let code = cart_code();
    add_to_cart(&client, &code, &product, 1).await;

    for path in ["/cart/", "/cart/stat/"] {
        let resp = client
            .get(format!("{}{path}?cart_code={code}", base_url()))
            .send()
            .await
            .expect("Failed to get cart");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
    }
}
