//! Catalog product types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use wellcart_core::{Category, Price, ProductId, Slug};

/// A catalog product.
///
/// Serializes as `{id, name, slug, image, description, price, category}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: Slug,
    /// Stored image path, possibly empty.
    pub image: String,
    pub description: Option<String>,
    pub price: Price,
    pub category: Option<Category>,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// A product together with other products from its category.
///
/// Serializes as `{id, name, slug, image, description, price,
/// similiar_products}`. The product's own category is left out; each similar
/// product carries its full listing shape.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: Product,
    /// Up to five products sharing the category, ordered by id.
    pub similar_products: Vec<Product>,
}

impl Serialize for ProductDetail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let product = &self.product;
        let mut s = serializer.serialize_struct("ProductDetail", 7)?;
        s.serialize_field("id", &product.id)?;
        s.serialize_field("name", &product.name)?;
        s.serialize_field("slug", &product.slug)?;
        s.serialize_field("image", &product.image)?;
        s.serialize_field("description", &product.description)?;
        s.serialize_field("price", &product.price)?;
        // Misspelled wire name is what existing clients read
        s.serialize_field("similiar_products", &self.similar_products)?;
        s.end()
    }
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub image: String,
    /// Explicit slug, used verbatim. Derived from `name` when absent.
    pub slug: Option<Slug>,
}

impl NewProduct {
    /// Maximum product name length (the column is `VARCHAR(100)`).
    pub const MAX_NAME_LENGTH: usize = 100;

    /// Maximum image path length.
    pub const MAX_IMAGE_LENGTH: usize = 100;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(id: i32, name: &str, price: &str, category: Option<Category>) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            slug: Slug::slugify(name),
            image: format!("img/{id}.png"),
            description: None,
            price: price.parse().unwrap(),
            category,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_product_wire_shape() {
        let value =
            serde_json::to_value(product(1, "Vitamin C", "12.5", Some(Category::Supplement)))
                .unwrap();

        assert_eq!(value["slug"], "vitamin-c");
        assert_eq!(value["price"], "12.50");
        assert_eq!(value["category"], "SP");
        assert!(value["description"].is_null());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_detail_uses_legacy_similar_field() {
        let detail = ProductDetail {
            product: product(1, "Vitamin C", "12.50", Some(Category::Supplement)),
            similar_products: vec![product(2, "Zinc", "4.00", Some(Category::Supplement))],
        };
        let value = serde_json::to_value(detail).unwrap();

        assert_eq!(value["name"], "Vitamin C");
        assert_eq!(value["price"], "12.50");
        assert_eq!(value["similiar_products"][0]["name"], "Zinc");
        assert_eq!(value["similiar_products"][0]["category"], "SP");
        assert!(value.get("similar_products").is_none());
        assert!(value.get("category").is_none());
        assert!(value.get("created_at").is_none());
    }
}
