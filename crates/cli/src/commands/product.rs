//! Catalog management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a product; the slug is derived from the name unless given
//! wellcart product create --name "Vitamin C" --price 12.50 --category SP
//!
//! # List the catalog
//! wellcart product list
//! ```

use wellcart_core::{Category, Price, Slug};
use wellcart_storefront::db::ProductRepository;
use wellcart_storefront::models::NewProduct;

use super::{CommandError, connect};

/// Arguments for `product create`, as parsed from the command line.
#[derive(Debug, Clone)]
pub struct CreateArgs {
    pub name: String,
    pub price: Price,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub slug: Option<String>,
}

/// Check the arguments and build the product to insert.
fn new_product(args: CreateArgs) -> Result<NewProduct, CommandError> {
    let name = args.name.trim().to_owned();
    if name.is_empty() {
        return Err(CommandError::InvalidArgument("name cannot be blank".to_owned()));
    }
    if name.chars().count() > NewProduct::MAX_NAME_LENGTH {
        return Err(CommandError::InvalidArgument(format!(
            "name must be at most {} characters",
            NewProduct::MAX_NAME_LENGTH
        )));
    }

    let image = args.image.unwrap_or_default();
    if image.chars().count() > NewProduct::MAX_IMAGE_LENGTH {
        return Err(CommandError::InvalidArgument(format!(
            "image must be at most {} characters",
            NewProduct::MAX_IMAGE_LENGTH
        )));
    }

    let slug = args
        .slug
        .map(|raw| {
            Slug::parse(&raw).ok_or_else(|| {
                CommandError::InvalidArgument(format!(
                    "slug {raw:?} must be 1-{} letters, digits, '-' or '_'",
                    Slug::MAX_LENGTH
                ))
            })
        })
        .transpose()?;

    Ok(NewProduct {
        name,
        price: args.price,
        category: args.category,
        description: args.description.filter(|d| !d.trim().is_empty()),
        image,
        slug,
    })
}

/// Create a product.
///
/// # Errors
///
/// Returns an error if the arguments are invalid, the explicit slug is taken,
/// or the database operation fails.
pub async fn create(args: CreateArgs) -> Result<(), CommandError> {
    let product = new_product(args)?;
    let pool = connect().await?;

    let created = ProductRepository::new(&pool).create(&product).await?;

    tracing::info!(
        "Product created! ID: {}, Slug: {}, Price: {}",
        created.id,
        created.slug,
        created.price
    );
    Ok(())
}

/// Print every product, ordered by id.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn list() -> Result<(), CommandError> {
    let pool = connect().await?;
    let products = ProductRepository::new(&pool).list().await?;

    tracing::info!("{} products", products.len());
    for product in products {
        tracing::info!(
            "  {:>4}  {:<30}  {:>10}  {:<4}  {}",
            product.id,
            product.slug,
            product.price,
            product.category.map_or("-", |c| c.code()),
            product.name
        );
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args(name: &str) -> CreateArgs {
        CreateArgs {
            name: name.to_owned(),
            price: "9.99".parse().unwrap(),
            category: Some(Category::Supplement),
            description: None,
            image: None,
            slug: None,
        }
    }

    #[test]
    fn test_new_product_trims_name_and_defaults_image() {
        let product = new_product(args("  Zinc Tablets ")).unwrap();

        assert_eq!(product.name, "Zinc Tablets");
        assert_eq!(product.image, "");
        assert!(product.slug.is_none());
    }

    #[test]
    fn test_new_product_rejects_blank_and_long_names() {
        assert!(matches!(
            new_product(args("   ")),
            Err(CommandError::InvalidArgument(_))
        ));
        assert!(matches!(
            new_product(args(&"x".repeat(101))),
            Err(CommandError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_new_product_explicit_slug() {
        let mut with_slug = args("Zinc");
        with_slug.slug = Some("zinc_50mg".to_owned());
        assert_eq!(new_product(with_slug).unwrap().slug.unwrap().as_str(), "zinc_50mg");

        let mut bad_slug = args("Zinc");
        bad_slug.slug = Some("zinc 50mg".to_owned());
        assert!(matches!(
            new_product(bad_slug),
            Err(CommandError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_blank_description_is_dropped() {
        let mut blank = args("Zinc");
        blank.description = Some("  ".to_owned());
        assert!(new_product(blank).unwrap().description.is_none());
    }
}
