//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                 - Liveness check
//! GET    /health/ready           - Readiness check (database)
//!
//! # Accounts
//! POST   /register               - Create an account (rate limited)
//! POST   /login                  - Start a session (rate limited)
//! POST   /logout                 - End the session
//! PATCH  /update_biodata         - Partial profile update (session)
//! GET    /me/username            - Current username (session)
//! GET    /me/info                - Current profile (session)
//!
//! # Catalog
//! GET    /products               - Product listing
//! GET    /products/{slug}        - Product detail with similar products
//!
//! # Cart (keyed by client cart code)
//! GET    /cart                   - Paid cart with items and totals
//! GET    /cart/stat              - Paid cart item count
//! POST   /cart/add               - Add or overwrite a product line
//! PATCH  /cart/update-quantity   - Change a line's quantity
//! DELETE /cart/delete            - Remove a product line
//! GET    /cart/in-cart           - Whether a product is in a cart
//! ```
//!
//! Paths are matched without a trailing slash; the server strips it before
//! routing so `/products/` and `/products` are the same route.

pub mod account;
pub mod cart;
pub mod me;
pub mod products;

use axum::{
    Router,
    extract::{FromRequest, State},
    http::{HeaderValue, Method, StatusCode, header},
    routing::{delete, get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, create_session_layer, request_id_middleware};
use crate::state::AppState;

/// JSON body extractor whose rejections are JSON `AppError`s.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Account routes behind the login/registration rate limiter.
fn limited_account_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(account::register))
        .route("/login", post(account::login))
        .layer(auth_rate_limiter())
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .merge(limited_account_routes())
        .route("/logout", post(account::logout))
        .route("/update_biodata", patch(account::update_biodata))
        .route("/me/username", get(me::username))
        .route("/me/info", get(me::info))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/stat", get(cart::stat))
        .route("/add", post(cart::add))
        .route("/update-quantity", patch(cart::update_quantity))
        .route("/delete", delete(cart::remove))
        .route("/in-cart", get(cart::in_cart))
}

/// CORS for the configured frontend origin, with credentials.
fn cors_layer(state: &AppState) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_credentials(true);

    match HeaderValue::from_str(&state.config().frontend_origin()) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(error = %e, "FRONTEND_BASE_URL is not a valid origin, CORS disabled");
            layer
        }
    }
}

/// Build the full application router with its middleware stack.
pub fn router(state: AppState) -> Router {
    let session_layer = create_session_layer(state.pool(), state.config());
    let cors = cors_layer(&state);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(account_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .layer(cors)
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use sqlx::postgres::PgPoolOptions;
    use tower::{Layer, ServiceExt};
    use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

    use super::*;
    use crate::config::StorefrontConfig;

    /// Router over a pool that never connects; only paths that fail before
    /// touching the database can be exercised.
    pub(crate) fn offline_app() -> NormalizePath<Router> {
        let config = StorefrontConfig {
            database_url: "postgres://offline@localhost:1/none".to_owned().into(),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            public_url: "http://127.0.0.1:8000".parse().unwrap(),
            frontend_url: "http://localhost:3000".parse().unwrap(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://offline@localhost:1/none")
            .unwrap();
        NormalizePathLayer::trim_trailing_slash().layer(router(AppState::new(config, pool)))
    }

    pub(crate) async fn send(
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", "203.0.113.9");
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = offline_app()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::test_support::send;
    use super::*;

    #[tokio::test]
    async fn test_health_with_and_without_trailing_slash() {
        let (status, _) = send(Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(Method::GET, "/health/", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_json_is_json_error() {
        let (status, body) = send(Method::POST, "/cart/add/", Some(json!([1, 2]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
