//! Cart aggregate: carts, their items, and the derived totals.
//!
//! Totals are never stored. Every response recomputes line totals
//! (`quantity * price`), the cart's `sum_total` and `num_of_items` from the
//! items that were just read.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use wellcart_core::{CartCode, CartId, CartItemId, Price, Quantity, UserId};

use super::product::Product;

/// A cart row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub id: CartId,
    pub cart_code: CartCode,
    /// Owner, set once a payment is started for the cart.
    pub user_id: Option<UserId>,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// One product line in a cart.
///
/// Serializes as `{id, quantity, product, total}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub quantity: Quantity,
    pub product: Product,
}

impl CartItem {
    /// `quantity * product.price`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.product.price.line_total(self.quantity)
    }
}

impl Serialize for CartItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("CartItem", 4)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("quantity", &self.quantity)?;
        s.serialize_field("product", &self.product)?;
        s.serialize_field("total", &self.total())?;
        s.end()
    }
}

/// A cart with all of its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartDetail {
    pub cart: Cart,
    pub items: Vec<CartItem>,
}

impl CartDetail {
    /// Sum of all line totals; `0.00` for an empty cart.
    #[must_use]
    pub fn sum_total(&self) -> Decimal {
        Price::sum(self.items.iter().map(CartItem::total))
    }

    /// Sum of all item quantities; `0` for an empty cart.
    #[must_use]
    pub fn num_of_items(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// The compact `{id, cart_code, num_of_items}` view.
    #[must_use]
    pub fn stat(&self) -> CartStat {
        CartStat {
            id: self.cart.id,
            cart_code: self.cart.cart_code.clone(),
            num_of_items: self.num_of_items(),
        }
    }
}

impl Serialize for CartDetail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Cart", 7)?;
        s.serialize_field("id", &self.cart.id)?;
        s.serialize_field("cart_code", &self.cart.cart_code)?;
        s.serialize_field("items", &self.items)?;
        s.serialize_field("sum_total", &self.sum_total())?;
        s.serialize_field("num_of_items", &self.num_of_items())?;
        s.serialize_field("created_at", &self.cart.created_at)?;
        s.serialize_field("modified_at", &self.cart.modified_at)?;
        s.end()
    }
}

/// Item count summary for a cart.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CartStat {
    pub id: CartId,
    pub cart_code: CartCode,
    pub num_of_items: u64,
}
