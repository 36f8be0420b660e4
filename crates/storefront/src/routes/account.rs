//! Account route handlers: registration, session login/logout and profile
//! updates.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use super::ApiJson;
use crate::db::RepositoryError;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::NOT_AUTHENTICATED;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, UserProfile};
use crate::services::auth::{AuthError, AuthService, BiodataForm, LoginForm, RegistrationForm};
use crate::state::AppState;

/// Create an account.
#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<RegistrationForm>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let user = AuthService::new(state.pool()).register(form).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user.profile())))
}

/// Verify credentials and start a session.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(form): ApiJson<LoginForm>,
) -> Result<Json<UserProfile>> {
    let user = AuthService::new(state.pool())
        .login(form)
        .await
        .inspect_err(|e| {
            if matches!(e, AuthError::InvalidCredentials) {
                tracing::info!("login rejected");
            }
        })?;

    set_current_user(&session, &CurrentUser::from(&user)).await?;
    set_sentry_user(&user.id, &user.username);
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(user.profile()))
}

/// End the session. Succeeds whether or not anyone was logged in.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(Json(json!({ "message": "Logged out successfully." })))
}

/// Partially update the logged-in user's profile.
#[instrument(skip(state, current_user, form), fields(user_id = %current_user.id))]
pub async fn update_biodata(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    ApiJson(form): ApiJson<BiodataForm>,
) -> Result<Json<UserProfile>> {
    let user = AuthService::new(state.pool())
        .update_profile(current_user.id, form)
        .await
        .map_err(|e| match e {
            // The account was removed after the session was issued.
            AuthError::Repository(RepositoryError::NotFound) => {
                AppError::Unauthorized(NOT_AUTHENTICATED.to_owned())
            }
            other => other.into(),
        })?;

    Ok(Json(user.profile()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Method;

    use super::*;
    use crate::routes::test_support::send;

    #[tokio::test]
    async fn test_register_reports_missing_fields() {
        let (status, body) = send(Method::POST, "/register/", Some(json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        for field in ["username", "password", "password2"] {
            assert_eq!(body[field], json!(["This field is required."]), "{field}");
        }
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password_before_touching_database() {
        let (status, body) = send(
            Method::POST,
            "/register",
            Some(json!({"username": "ada", "password": "12345678", "password2": "12345678"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let messages = body["password"].as_array().unwrap();
        assert!(messages.contains(&json!("This password is entirely numeric.")));
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let (status, body) = send(Method::POST, "/login/", Some(json!({"username": "ada"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["password"], json!(["This field is required."]));
    }

    #[tokio::test]
    async fn test_update_biodata_requires_session() {
        let (status, body) = send(
            Method::PATCH,
            "/update_biodata/",
            Some(json!({"city": "Lagos"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": NOT_AUTHENTICATED}));
    }
}
