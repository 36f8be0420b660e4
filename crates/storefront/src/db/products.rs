//! Product repository: catalog reads and slug-allocating inserts.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use wellcart_core::{Category, Price, ProductId, Slug};

use super::{RepositoryError, is_unique_violation};
use crate::models::product::{NewProduct, Product};

const PRODUCT_COLUMNS: &str = "id, name, slug, image, description, price, category, created_at";

/// How many times a derived slug is re-allocated after losing an insert race.
const SLUG_ATTEMPTS: usize = 5;

/// Candidates checked per round trip while looking for a free slug.
const SLUG_BATCH: usize = 32;

/// Number of similar products shown on a product page.
pub const SIMILAR_LIMIT: i64 = 5;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub(crate) id: ProductId,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) image: String,
    pub(crate) description: Option<String>,
    pub(crate) price: Decimal,
    pub(crate) category: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;
        let category = row
            .category
            .as_deref()
            .map(str::parse::<Category>)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("product {}: {e}", row.id))
            })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            slug: Slug::from_stored(row.slug),
            image: row.image,
            description: row.description,
            price,
            category,
            created_at: row.created_at,
        })
    }
}

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?
        .map(Product::try_from)
        .transpose()
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(Product::try_from)
        .transpose()
    }

    /// Products in the same category as `product`, excluding it, ordered by
    /// id and capped at [`SIMILAR_LIMIT`].
    ///
    /// Uncategorized products are similar to each other.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn similar(&self, product: &Product) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product
            WHERE category IS NOT DISTINCT FROM $1 AND id <> $2
            ORDER BY id
            LIMIT $3
            "
        ))
        .bind(product.category.as_ref().map(Category::code))
        .bind(product.id)
        .bind(SIMILAR_LIMIT)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Create a product.
    ///
    /// An explicit slug is stored verbatim. Otherwise the slug is derived from
    /// the name and the first free candidate (`base`, `base-1`, `base-2`, ...)
    /// is taken; if a concurrent insert claims it first the allocation is
    /// retried.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the explicit slug is taken or no
    /// derived slug could be claimed after several attempts.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        if let Some(slug) = &product.slug {
            return self
                .insert(product, slug)
                .await
                .map_err(|e| RepositoryError::unique_violation(e, "slug"))?
                .try_into();
        }

        let base = Slug::slugify(&product.name);
        for attempt in 1..=SLUG_ATTEMPTS {
            let slug = self.next_available_slug(&base).await?;
            match self.insert(product, &slug).await {
                Ok(row) => return row.try_into(),
                Err(e) if is_unique_violation(&e) => {
                    tracing::warn!(slug = %slug, attempt, "slug claimed concurrently, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(RepositoryError::Conflict(format!(
            "could not allocate a unique slug for {base}"
        )))
    }

    /// First candidate for `base` that no stored product uses.
    async fn next_available_slug(&self, base: &Slug) -> Result<Slug, RepositoryError> {
        let mut candidates = base.candidates();
        loop {
            let batch: Vec<String> = candidates
                .by_ref()
                .take(SLUG_BATCH)
                .map(Slug::into_inner)
                .collect();
            if batch.is_empty() {
                return Err(RepositoryError::Conflict(format!(
                    "no free slug left for {base}"
                )));
            }

            let taken: HashSet<String> =
                sqlx::query_scalar("SELECT slug FROM shop.product WHERE slug = ANY($1)")
                    .bind(&batch)
                    .fetch_all(self.pool)
                    .await?
                    .into_iter()
                    .collect();

            if let Some(free) = batch.into_iter().find(|c| !taken.contains(c)) {
                return Ok(Slug::from_stored(free));
            }
        }
    }

    async fn insert(&self, product: &NewProduct, slug: &Slug) -> Result<ProductRow, sqlx::Error> {
        sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO shop.product (name, slug, image, description, price, category)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&product.name)
        .bind(slug.as_str())
        .bind(&product.image)
        .bind(product.description.as_deref())
        .bind(product.price.amount())
        .bind(product.category.as_ref().map(Category::code))
        .fetch_one(self.pool)
        .await
    }
}
