//! Payment commands.
//!
//! There is no payment provider integration; an operator starts a payment
//! for a cart and later records its outcome.
//!
//! # Usage
//!
//! ```bash
//! # Link a cart to a user and record a pending payment for its total
//! wellcart payment start --cart-code 3f0c... --username ada
//!
//! # Record the outcome (completing also marks the cart paid)
//! wellcart payment complete <REF>
//! wellcart payment fail <REF>
//! wellcart payment cancel <REF>
//! ```

use wellcart_core::{CartCode, TransactionStatus};
use wellcart_storefront::db::{TransactionRepository, UserRepository};

use super::{CommandError, connect};

/// Start a pending payment for a cart on behalf of a user.
///
/// # Errors
///
/// Returns an error if the cart code is malformed, the user or cart doesn't
/// exist, the cart is empty or already paid, or the database operation fails.
pub async fn start(
    cart_code: &str,
    username: &str,
    currency: Option<&str>,
) -> Result<(), CommandError> {
    let code =
        CartCode::parse(cart_code).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    let currency = currency.map(str::trim).filter(|c| !c.is_empty());
    if let Some(currency) = currency
        && (currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()))
    {
        return Err(CommandError::InvalidArgument(format!(
            "currency {currency:?} must be a three-letter code such as NGN"
        )));
    }

    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .get_by_username(username)
        .await?
        .ok_or_else(|| CommandError::InvalidArgument(format!("no user named {username:?}")))?;

    let transaction = TransactionRepository::new(&pool)
        .start(&code, user.id, currency)
        .await?;

    tracing::info!(
        "Payment started! Ref: {}, Amount: {} {}, Cart: {}",
        transaction.reference,
        transaction.amount,
        transaction.currency,
        code
    );
    Ok(())
}

/// Record the final outcome of a pending payment.
///
/// # Errors
///
/// Returns an error if no transaction has this reference, it was already
/// resolved, or the database operation fails.
pub async fn resolve(reference: &str, status: TransactionStatus) -> Result<(), CommandError> {
    let pool = connect().await?;

    let transaction = TransactionRepository::new(&pool)
        .resolve(reference, status)
        .await?;

    tracing::info!(
        "Payment {} is now {} (cart {})",
        transaction.reference,
        transaction.status,
        transaction.cart_id
    );
    Ok(())
}
