//! Session user lookups.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::middleware::auth::NOT_AUTHENTICATED;
use crate::models::{CurrentUser, User, UserProfile};
use crate::state::AppState;

/// Username of the logged-in user.
#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn username(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
) -> Result<Json<Value>> {
    let user = session_user(&state, &current_user).await?;
    Ok(Json(json!({ "username": user.username })))
}

/// Full profile of the logged-in user.
#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn info(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
) -> Result<Json<UserProfile>> {
    let user = session_user(&state, &current_user).await?;
    Ok(Json(user.profile()))
}

/// Reload the session's user; a deleted account no longer counts as logged in.
async fn session_user(state: &AppState, current_user: &CurrentUser) -> Result<User> {
    UserRepository::new(state.pool())
        .get_by_id(current_user.id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("session refers to a deleted user");
            AppError::Unauthorized(NOT_AUTHENTICATED.to_owned())
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, StatusCode};

    use super::*;
    use crate::routes::test_support::send;

    #[tokio::test]
    async fn test_me_endpoints_require_session() {
        for uri in ["/me/username/", "/me/info", "/me/info/"] {
            let (status, body) = send(Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body, json!({"error": NOT_AUTHENTICATED}));
        }
    }
}
