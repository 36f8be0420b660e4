//! CLI subcommand implementations.

pub mod migrate;
pub mod payment;
pub mod product;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use wellcart_storefront::db::{self, RepositoryError};

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying migrations failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A repository operation failed.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// An argument was rejected before touching the database.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Connect to the shop database named by `WELLCART_DATABASE_URL`
/// (or `DATABASE_URL`).
pub(crate) async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("WELLCART_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("WELLCART_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
