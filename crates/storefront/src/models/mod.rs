//! Domain models for the storefront.

pub mod cart;
pub mod product;
pub mod session;
pub mod transaction;
pub mod user;

pub use cart::{Cart, CartDetail, CartItem, CartStat};
pub use product::{NewProduct, Product, ProductDetail};
pub use session::{CurrentUser, keys as session_keys};
pub use transaction::Transaction;
pub use user::{NewUser, ProfileUpdate, User, UserProfile};
