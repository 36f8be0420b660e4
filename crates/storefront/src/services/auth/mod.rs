//! Account service: registration, password login and profile updates.

mod error;
pub mod forms;
pub mod password;

pub use error::AuthError;
pub use forms::{BiodataForm, LoginForm, RegistrationForm};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use wellcart_core::UserId;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;

/// Account service.
///
/// Validates submitted forms, hashes passwords with Argon2id and persists
/// accounts through the user repository.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Invalid` with per-field messages if the form is invalid.
    /// Returns `AuthError::UsernameTaken` if the username is already registered.
    pub async fn register(&self, form: RegistrationForm) -> Result<User, AuthError> {
        let registration = form.validate()?;

        if self.users.username_exists(&registration.user.username).await? {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = hash_password(&registration.password)?;

        self.users
            .create(&registration.user, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::Repository(other),
            })
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Invalid` if a field is missing.
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub async fn login(&self, form: LoginForm) -> Result<User, AuthError> {
        let (username, password) = form.validate()?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&password, &password_hash)?;

        Ok(user)
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Invalid` if a supplied field is invalid.
    /// Returns `AuthError::Repository` with `RepositoryError::NotFound` if the
    /// user no longer exists.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        form: BiodataForm,
    ) -> Result<User, AuthError> {
        let update = form.validate()?;

        if update.is_empty() {
            return self
                .users
                .get_by_id(user_id)
                .await?
                .ok_or(AuthError::Repository(RepositoryError::NotFound));
        }

        Ok(self.users.update_profile(user_id, &update).await?)
    }
}

/// Hash a password into an Argon2id PHC string.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
