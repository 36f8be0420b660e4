//! Cart route handlers.
//!
//! Carts are identified by a client-generated cart code rather than the
//! session, so anonymous shoppers can build a cart before registering. Cart
//! bodies are read as loose JSON objects: clients send ids and quantities as
//! numbers or numeric strings.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::instrument;

use wellcart_core::{
    CartCode, CartItemId, ProductId, Quantity, QuantityError, integer_from_json,
};

use super::ApiJson;
use crate::db::{CartRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::{CartDetail, CartStat};
use crate::state::AppState;

const CART_NOT_FOUND: &str = "Cart not found.";
const PRODUCT_NOT_FOUND: &str = "Product not found.";
const ITEM_NOT_FOUND: &str = "Cart item not found.";

/// Query parameters identifying a product line in a cart.
#[derive(Debug, Default, Deserialize)]
pub struct CartItemQuery {
    pub cart_code: Option<String>,
    pub product_id: Option<String>,
}

/// Query parameters identifying a cart.
#[derive(Debug, Default, Deserialize)]
pub struct CartQuery {
    pub cart_code: Option<String>,
}

/// A validated `POST /cart/add` body.
#[derive(Debug, PartialEq, Eq)]
struct AddItem {
    cart_code: CartCode,
    product_id: ProductId,
    quantity: Quantity,
}

/// A validated `PATCH /cart/update-quantity` body.
#[derive(Debug, PartialEq, Eq)]
struct UpdateQuantity {
    item_id: CartItemId,
    quantity: Quantity,
}

/// Add a product to a cart, creating the cart on first use.
///
/// Adding a product that is already in the cart overwrites its quantity.
#[instrument(skip(state, body))]
pub async fn add(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<(StatusCode, Json<Value>)> {
    let request = parse_add_item(&body)?;

    let product = ProductRepository::new(state.pool())
        .get_by_id(request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(PRODUCT_NOT_FOUND.to_owned()))?;

    let added = CartRepository::new(state.pool())
        .add_item(&request.cart_code, &product, request.quantity)
        .await?;

    let message = if added.created {
        "Cart item added successfully"
    } else {
        "Cart item updated successfully"
    };
    tracing::info!(
        cart_code = %request.cart_code,
        product_id = %product.id,
        quantity = %request.quantity,
        created = added.created,
        "cart item saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "data": added.item, "message": message })),
    ))
}

/// Change the quantity of an existing cart item.
#[instrument(skip(state, body))]
pub async fn update_quantity(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<Json<Value>> {
    let request = parse_update_quantity(&body)?;

    let item = CartRepository::new(state.pool())
        .update_item_quantity(request.item_id, request.quantity)
        .await?
        .ok_or_else(|| AppError::NotFound(ITEM_NOT_FOUND.to_owned()))?;

    Ok(Json(json!({
        "data": item,
        "message": "Cart item updated successfully."
    })))
}

/// Remove a product from a cart.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Query(query): Query<CartItemQuery>,
) -> Result<Json<Value>> {
    let (code, product_id) = parse_item_query(&query, "cart_code and product_id are required.")?;

    // An unparseable code can't name a stored cart.
    let Ok(code) = code else {
        return Err(AppError::NotFound(ITEM_NOT_FOUND.to_owned()));
    };

    let deleted = CartRepository::new(state.pool())
        .delete_item(&code, product_id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound(ITEM_NOT_FOUND.to_owned()));
    }

    Ok(Json(json!({ "message": "Cart item deleted successfully." })))
}

/// Whether a product is in a cart.
///
/// Both the cart and the product must exist.
#[instrument(skip(state))]
pub async fn in_cart(
    State(state): State<AppState>,
    Query(query): Query<CartItemQuery>,
) -> Result<Json<Value>> {
    let (code, product_id) = parse_item_query(
        &query,
        "cart_code and product_id are required query parameters.",
    )?;

    let not_found = || AppError::NotFound(CART_NOT_FOUND.to_owned());
    let code = code.map_err(|_| not_found())?;

    let product_in_cart = CartRepository::new(state.pool())
        .contains_product(&code, product_id)
        .await?
        .ok_or_else(not_found)?;

    if !product_in_cart {
        ProductRepository::new(state.pool())
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(PRODUCT_NOT_FOUND.to_owned()))?;
    }

    Ok(Json(json!({ "product_in_cart": product_in_cart })))
}

/// Item count of a paid cart.
#[instrument(skip(state))]
pub async fn stat(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> Result<Json<CartStat>> {
    let detail = paid_cart(&state, &query).await?;
    Ok(Json(detail.stat()))
}

/// A paid cart with its items and totals.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> Result<Json<CartDetail>> {
    Ok(Json(paid_cart(&state, &query).await?))
}

async fn paid_cart(state: &AppState, query: &CartQuery) -> Result<CartDetail> {
    let raw = query
        .cart_code
        .as_deref()
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("cart_code is required.".to_owned()))?;

    let not_found = || AppError::NotFound(CART_NOT_FOUND.to_owned());
    let code = CartCode::parse(raw).map_err(|_| not_found())?;

    CartRepository::new(state.pool())
        .get_paid_detail(&code)
        .await?
        .ok_or_else(not_found)
}

// =============================================================================
// Request Parsing
// =============================================================================

fn field<'a>(body: &'a Map<String, Value>, name: &str) -> Result<&'a Value> {
    body.get(name)
        .filter(|value| !value.is_null())
        .ok_or_else(|| AppError::BadRequest(format!("Missing field: {name}")))
}

fn parse_add_item(body: &Map<String, Value>) -> Result<AddItem> {
    let cart_code = field(body, "cart_code")?;
    let product_id = field(body, "product_id")?;
    let quantity = field(body, "quantity")?;

    let quantity = Quantity::from_json(quantity).map_err(|e| match e {
        QuantityError::NotInteger => bad_request("Quantity must be an integer."),
        QuantityError::NotPositive => bad_request("Quantity must be a positive integer."),
        QuantityError::TooLarge { max } => bad_request(&format!("Quantity must be at most {max}.")),
    })?;

    let product_id = json_id(product_id)
        .map(ProductId::new)
        .ok_or_else(|| bad_request("product_id must be an integer."))?;

    let cart_code = CartCode::from_json(cart_code).map_err(|e| bad_request(&e.to_string()))?;

    Ok(AddItem {
        cart_code,
        product_id,
        quantity,
    })
}

fn parse_update_quantity(body: &Map<String, Value>) -> Result<UpdateQuantity> {
    let item_id = field(body, "item_id")?;
    let quantity = field(body, "quantity")?;

    let quantity = Quantity::from_json(quantity).map_err(|e| match e {
        QuantityError::NotInteger => bad_request("Quantity must be an integer."),
        QuantityError::NotPositive => bad_request("Quantity must be greater than 0."),
        QuantityError::TooLarge { max } => bad_request(&format!("Quantity must be at most {max}.")),
    })?;

    let item_id = json_id(item_id)
        .map(CartItemId::new)
        .ok_or_else(|| bad_request("item_id must be an integer."))?;

    Ok(UpdateQuantity { item_id, quantity })
}

/// Parse `cart_code` and `product_id` query parameters.
///
/// Both must be present. The cart code is returned unparsed-on-error so
/// callers can decide whether a malformed code means "not found".
fn parse_item_query(
    query: &CartItemQuery,
    missing: &str,
) -> Result<(std::result::Result<CartCode, wellcart_core::CartCodeError>, ProductId)> {
    let (Some(code), Some(product_id)) = (
        query.cart_code.as_deref().filter(|s| !s.trim().is_empty()),
        query.product_id.as_deref().filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(bad_request(missing));
    };

    let product_id = product_id
        .parse::<ProductId>()
        .map_err(|_| bad_request("product_id must be an integer."))?;

    Ok((CartCode::parse(code), product_id))
}

/// An `i32` id from a JSON number or numeric string.
fn json_id(value: &Value) -> Option<i32> {
    integer_from_json(value).and_then(|n| i32::try_from(n).ok())
}

fn bad_request(message: &str) -> AppError {
    AppError::BadRequest(message.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Method;

    use super::*;
    use crate::routes::test_support::send;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn error_message(err: AppError) -> String {
        match err {
            AppError::BadRequest(msg) => msg,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_add_item() {
        let request =
            parse_add_item(&body(json!({"cart_code": "c1", "product_id": "4", "quantity": 2})))
                .unwrap();

        assert_eq!(
            request,
            AddItem {
                cart_code: CartCode::parse("c1").unwrap(),
                product_id: ProductId::new(4),
                quantity: Quantity::new(2).unwrap(),
            }
        );
    }

    #[test]
    fn test_add_item_missing_fields_in_order() {
        let err = parse_add_item(&body(json!({}))).unwrap_err();
        assert_eq!(error_message(err), "Missing field: cart_code");

        let err = parse_add_item(&body(json!({"cart_code": "c1", "quantity": 1}))).unwrap_err();
        assert_eq!(error_message(err), "Missing field: product_id");

        let err = parse_add_item(&body(json!({"cart_code": "c1", "product_id": 1, "quantity": null})))
            .unwrap_err();
        assert_eq!(error_message(err), "Missing field: quantity");
    }

    #[test]
    fn test_add_item_quantity_rules() {
        let err = parse_add_item(&body(json!({"cart_code": "c", "product_id": 1, "quantity": "two"})))
            .unwrap_err();
        assert_eq!(error_message(err), "Quantity must be an integer.");

        for quantity in [json!(0), json!(-2), json!("-1")] {
            let err = parse_add_item(&body(
                json!({"cart_code": "c", "product_id": 1, "quantity": quantity}),
            ))
            .unwrap_err();
            assert_eq!(error_message(err), "Quantity must be a positive integer.");
        }
    }

    #[test]
    fn test_add_item_quantity_checked_before_product_id() {
        let err = parse_add_item(&body(
            json!({"cart_code": "c", "product_id": "abc", "quantity": 0}),
        ))
        .unwrap_err();
        assert_eq!(error_message(err), "Quantity must be a positive integer.");

        let err = parse_add_item(&body(
            json!({"cart_code": "c", "product_id": "abc", "quantity": 1}),
        ))
        .unwrap_err();
        assert_eq!(error_message(err), "product_id must be an integer.");
    }

    #[test]
    fn test_add_item_blank_cart_code() {
        let err = parse_add_item(&body(json!({"cart_code": "  ", "product_id": 1, "quantity": 1})))
            .unwrap_err();
        assert_eq!(error_message(err), "cart_code cannot be blank");
    }

    #[test]
    fn test_parse_update_quantity() {
        let request = parse_update_quantity(&body(json!({"item_id": 9, "quantity": "3"}))).unwrap();
        assert_eq!(request.item_id, CartItemId::new(9));
        assert_eq!(request.quantity.get(), 3);

        let err = parse_update_quantity(&body(json!({"quantity": 3}))).unwrap_err();
        assert_eq!(error_message(err), "Missing field: item_id");

        let err = parse_update_quantity(&body(json!({"item_id": 9, "quantity": 0}))).unwrap_err();
        assert_eq!(error_message(err), "Quantity must be greater than 0.");

        let err =
            parse_update_quantity(&body(json!({"item_id": 9, "quantity": 1.5}))).unwrap_err();
        assert_eq!(error_message(err), "Quantity must be an integer.");
    }

    #[test]
    fn test_item_query_requires_both_params() {
        let query = CartItemQuery {
            cart_code: Some("c1".to_owned()),
            product_id: None,
        };
        let err = parse_item_query(&query, "both required").unwrap_err();
        assert_eq!(error_message(err), "both required");

        let query = CartItemQuery {
            cart_code: Some("c1".to_owned()),
            product_id: Some("x".to_owned()),
        };
        let err = parse_item_query(&query, "both required").unwrap_err();
        assert_eq!(error_message(err), "product_id must be an integer.");
    }

    #[tokio::test]
    async fn test_add_rejects_zero_quantity_over_http() {
        let (status, body) = send(
            Method::POST,
            "/cart/add/",
            Some(json!({"cart_code": "abc", "product_id": 1, "quantity": 0})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Quantity must be a positive integer."}));
    }

    #[tokio::test]
    async fn test_delete_requires_params_over_http() {
        let (status, body) = send(Method::DELETE, "/cart/delete/?cart_code=abc", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "cart_code and product_id are required."}));
    }

    #[tokio::test]
    async fn test_in_cart_requires_params_over_http() {
        let (status, body) = send(Method::GET, "/cart/in-cart?product_id=1", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": "cart_code and product_id are required query parameters."})
        );
    }

    #[tokio::test]
    async fn test_in_cart_malformed_code_is_not_found_over_http() {
        let code = "c".repeat(51);
        let (status, body) = send(
            Method::GET,
            &format!("/cart/in-cart/?cart_code={code}&product_id=1"),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Cart not found."}));
    }

    #[tokio::test]
    async fn test_cart_requires_code_over_http() {
        for uri in ["/cart/", "/cart/stat/"] {
            let (status, body) = send(Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, json!({"error": "cart_code is required."}));
        }
    }
}
