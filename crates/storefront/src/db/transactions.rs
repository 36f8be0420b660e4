//! Payment transaction repository.
//!
//! A transaction snapshots a cart's total when payment starts. Completing it
//! marks the cart paid in the same database transaction, which is what makes
//! the cart visible on the cart summary endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use wellcart_core::{CartCode, CartId, Price, TransactionId, TransactionStatus, UserId};

use super::RepositoryError;
use super::carts::CartRepository;
use crate::models::cart::CartDetail;
use crate::models::transaction::{DEFAULT_CURRENCY, Transaction};

const TRANSACTION_COLUMNS: &str =
    "id, ref, cart_id, amount, currency, status, user_id, created_at, modified_at";

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: TransactionId,
    #[sqlx(rename = "ref")]
    reference: String,
    cart_id: CartId,
    amount: Decimal,
    currency: String,
    status: String,
    user_id: UserId,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<TransactionStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("transaction {}: {e}", row.reference))
        })?;

        Ok(Self {
            id: row.id,
            reference: row.reference,
            cart_id: row.cart_id,
            amount: row.amount,
            currency: row.currency,
            status,
            user_id: row.user_id,
            created_at: row.created_at,
            modified_at: row.modified_at,
        })
    }
}

/// Repository for payment transactions.
pub struct TransactionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransactionRepository<'a> {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Start a payment for the cart identified by `code` on behalf of `user_id`.
    ///
    /// Links the cart to the user and records a `pending` transaction for the
    /// current cart total under a fresh reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart doesn't exist.
    /// Returns `RepositoryError::Conflict` if the cart is empty, already paid,
    /// or its total doesn't fit a stored amount.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn start(
        &self,
        code: &CartCode,
        user_id: UserId,
        currency: Option<&str>,
    ) -> Result<Transaction, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let detail = CartRepository::lock_detail(&mut tx, code)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let amount = payment_amount(&detail)?;
        let cart_id = detail.cart.id;

        sqlx::query("UPDATE shop.cart SET user_id = $2, modified_at = NOW() WHERE id = $1")
            .bind(cart_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r"
            INSERT INTO shop.transaction (ref, cart_id, amount, currency, status, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TRANSACTION_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(cart_id)
        .bind(amount)
        .bind(currency.unwrap_or(DEFAULT_CURRENCY))
        .bind(TransactionStatus::Pending.as_str())
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::unique_violation(e, "transaction ref"))?;

        tx.commit().await?;

        row.try_into()
    }

    /// Get a transaction by its reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_ref(&self, reference: &str) -> Result<Option<Transaction>, RepositoryError> {
        sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM shop.transaction WHERE ref = $1"
        ))
        .bind(reference)
        .fetch_optional(self.pool)
        .await?
        .map(Transaction::try_from)
        .transpose()
    }

    /// Move a pending transaction to a final `status`.
    ///
    /// Completing a transaction also marks its cart as paid, atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no transaction has this reference.
    /// Returns `RepositoryError::Conflict` if the transaction is not pending or
    /// `status` is `pending`.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn resolve(
        &self,
        reference: &str,
        status: TransactionStatus,
    ) -> Result<Transaction, RepositoryError> {
        if !status.is_final() {
            return Err(RepositoryError::Conflict(
                "a transaction can only be resolved to a final status".to_owned(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r"
            UPDATE shop.transaction
            SET status = $2, modified_at = NOW()
            WHERE ref = $1 AND status = $3
            RETURNING {TRANSACTION_COLUMNS}
            "
        ))
        .bind(reference)
        .bind(status.as_str())
        .bind(TransactionStatus::Pending.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return match self.get_by_ref(reference).await? {
                Some(existing) => Err(RepositoryError::Conflict(format!(
                    "transaction {reference} is already {}",
                    existing.status
                ))),
                None => Err(RepositoryError::NotFound),
            };
        };

        if status == TransactionStatus::Completed {
            sqlx::query("UPDATE shop.cart SET paid = TRUE, modified_at = NOW() WHERE id = $1")
                .bind(row.cart_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        row.try_into()
    }
}

/// The amount a payment for `detail` is recorded at.
fn payment_amount(detail: &CartDetail) -> Result<Decimal, RepositoryError> {
    let code = &detail.cart.cart_code;
    if detail.cart.paid {
        return Err(RepositoryError::Conflict(format!("cart {code} is already paid")));
    }
    if detail.items.is_empty() {
        return Err(RepositoryError::Conflict(format!("cart {code} is empty")));
    }

    let total = detail.sum_total();
    Price::new(total).map(|price| price.amount()).map_err(|_| {
        RepositoryError::Conflict(format!("cart {code} total {total} is too large to pay"))
    })
}
