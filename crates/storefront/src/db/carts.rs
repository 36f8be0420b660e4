//! Cart repository.
//!
//! Carts are looked up by the client's cart code and created implicitly the
//! first time a code adds an item. Each (cart, product) pair has at most one
//! item row; adding the same product again overwrites its quantity.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use wellcart_core::{CartCode, CartId, CartItemId, ProductId, Quantity, UserId};

use super::RepositoryError;
use super::products::ProductRow;
use crate::models::cart::{Cart, CartDetail, CartItem};
use crate::models::product::Product;

const CART_COLUMNS: &str = "id, cart_code, user_id, paid, created_at, modified_at";

const ITEM_SELECT: &str = r"
    SELECT ci.id AS item_id, ci.cart_id, ci.quantity,
           p.id, p.name, p.slug, p.image, p.description, p.price, p.category, p.created_at
    FROM shop.cart_item ci
    JOIN shop.product p ON p.id = ci.product_id
";

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: CartId,
    cart_code: String,
    user_id: Option<UserId>,
    paid: bool,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl TryFrom<CartRow> for Cart {
    type Error = RepositoryError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        let cart_code = CartCode::parse(&row.cart_code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid cart_code for cart {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            cart_code,
            user_id: row.user_id,
            paid: row.paid,
            created_at: row.created_at,
            modified_at: row.modified_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    item_id: CartItemId,
    cart_id: CartId,
    quantity: i32,
    #[sqlx(flatten)]
    product: ProductRow,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::try_from(row.quantity).map_err(|e| {
            RepositoryError::DataCorruption(format!("cart item {}: {e}", row.item_id))
        })?;

        Ok(Self {
            id: row.item_id,
            cart_id: row.cart_id,
            quantity,
            product: Product::try_from(row.product)?,
        })
    }
}

/// Result of adding a product to a cart.
#[derive(Debug, Clone)]
pub struct AddedItem {
    pub item: CartItem,
    /// `true` when a new item row was inserted, `false` when an existing
    /// row's quantity was overwritten.
    pub created: bool,
}

/// Repository for carts and cart items.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a cart by code, paid or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &CartCode) -> Result<Option<Cart>, RepositoryError> {
        sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM shop.cart WHERE cart_code = $1"
        ))
        .bind(code.as_str())
        .fetch_optional(self.pool)
        .await?
        .map(Cart::try_from)
        .transpose()
    }

    /// Get a paid cart with all of its items.
    ///
    /// Unpaid and unknown carts both yield `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_paid_detail(
        &self,
        code: &CartCode,
    ) -> Result<Option<CartDetail>, RepositoryError> {
        let Some(cart) = self.get_by_code(code).await?.filter(|c| c.paid) else {
            return Ok(None);
        };
        let items = self.items(cart.id).await?;

        Ok(Some(CartDetail { cart, items }))
    }

    /// All items in a cart, ordered by item id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(&format!(
            "{ITEM_SELECT} WHERE ci.cart_id = $1 ORDER BY ci.id"
        ))
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartItem::try_from).collect()
    }

    /// Lock the cart for `code` and read it with its items inside `tx`.
    ///
    /// Concurrent item writes touch the cart row, so they wait until `tx`
    /// finishes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub(super) async fn lock_detail(
        tx: &mut Transaction<'_, Postgres>,
        code: &CartCode,
    ) -> Result<Option<CartDetail>, RepositoryError> {
        let Some(cart) = sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM shop.cart WHERE cart_code = $1 FOR UPDATE"
        ))
        .bind(code.as_str())
        .fetch_optional(&mut **tx)
        .await?
        else {
            return Ok(None);
        };
        let cart = Cart::try_from(cart)?;

        let items = sqlx::query_as::<_, CartItemRow>(&format!(
            "{ITEM_SELECT} WHERE ci.cart_id = $1 ORDER BY ci.id"
        ))
        .bind(cart.id)
        .fetch_all(&mut **tx)
        .await?
        .into_iter()
        .map(CartItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(CartDetail { cart, items }))
    }

    /// Get a single cart item by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_item(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError> {
        sqlx::query_as::<_, CartItemRow>(&format!("{ITEM_SELECT} WHERE ci.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .map(CartItem::try_from)
            .transpose()
    }

    /// Put `quantity` units of `product` into the cart identified by `code`.
    ///
    /// The cart is created if the code is new. An existing item for the same
    /// product keeps its row and takes the new quantity. The cart's
    /// `modified_at` is bumped. Everything runs in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_item(
        &self,
        code: &CartCode,
        product: &Product,
        quantity: Quantity,
    ) -> Result<AddedItem, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart = get_or_create(&mut tx, code).await?;

        let (item_id, created): (CartItemId, bool) = sqlx::query_as(
            r"
            INSERT INTO shop.cart_item (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
                DO UPDATE SET quantity = EXCLUDED.quantity
            RETURNING id, (xmax = 0) AS created
            ",
        )
        .bind(cart.id)
        .bind(product.id)
        .bind(quantity.as_i32())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AddedItem {
            item: CartItem {
                id: item_id,
                cart_id: cart.id,
                quantity,
                product: product.clone(),
            },
            created,
        })
    }

    /// Remove a product from the cart identified by `code`.
    ///
    /// Returns `false` if the cart or the item doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn delete_item(
        &self,
        code: &CartCode,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart_id: Option<CartId> = sqlx::query_scalar(
            r"
            DELETE FROM shop.cart_item ci
            USING shop.cart c
            WHERE ci.cart_id = c.id AND c.cart_code = $1 AND ci.product_id = $2
            RETURNING ci.cart_id
            ",
        )
        .bind(code.as_str())
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(cart_id) = cart_id else {
            return Ok(false);
        };
        touch(&mut tx, cart_id).await?;
        tx.commit().await?;

        Ok(true)
    }

    /// Whether the cart identified by `code` holds `product_id`.
    ///
    /// Returns `None` if no cart has that code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contains_product(
        &self,
        code: &CartCode,
        product_id: ProductId,
    ) -> Result<Option<bool>, RepositoryError> {
        let exists: Option<bool> = sqlx::query_scalar(
            r"
            SELECT EXISTS(
                SELECT 1 FROM shop.cart_item ci
                WHERE ci.cart_id = c.id AND ci.product_id = $2
            )
            FROM shop.cart c
            WHERE c.cart_code = $1
            ",
        )
        .bind(code.as_str())
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(exists)
    }

    /// Set the quantity of an existing item.
    ///
    /// Returns `None` if the item doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update_item_quantity(
        &self,
        id: CartItemId,
        quantity: Quantity,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart_id: Option<CartId> = sqlx::query_scalar(
            "UPDATE shop.cart_item SET quantity = $2 WHERE id = $1 RETURNING cart_id",
        )
        .bind(id)
        .bind(quantity.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(cart_id) = cart_id else {
            return Ok(None);
        };
        touch(&mut tx, cart_id).await?;
        tx.commit().await?;

        self.get_item(id).await
    }
}

/// Fetch the cart for `code`, inserting it if missing, and bump its
/// `modified_at`.
async fn get_or_create(
    tx: &mut Transaction<'_, Postgres>,
    code: &CartCode,
) -> Result<Cart, RepositoryError> {
    sqlx::query_as::<_, CartRow>(&format!(
        r"
        INSERT INTO shop.cart (cart_code)
        VALUES ($1)
        ON CONFLICT (cart_code) DO UPDATE SET modified_at = NOW()
        RETURNING {CART_COLUMNS}
        "
    ))
    .bind(code.as_str())
    .fetch_one(&mut **tx)
    .await?
    .try_into()
}

async fn touch(tx: &mut Transaction<'_, Postgres>, cart_id: CartId) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE shop.cart SET modified_at = NOW() WHERE id = $1")
        .bind(cart_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
