//! Payment transaction records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use wellcart_core::{CartId, TransactionId, TransactionStatus, UserId};

/// Currency recorded when none is given.
pub const DEFAULT_CURRENCY: &str = "NGN";

/// A payment attempt for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Unique payment reference handed to the payer.
    #[serde(rename = "ref")]
    pub reference: String,
    pub cart_id: CartId,
    /// Cart total at the time the payment was started.
    pub amount: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}
