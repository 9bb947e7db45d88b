//! Data structures representing database entities and their response shapes.

pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

pub use cart_item::{CartItem, CartItemDetails};
pub use order::{Order, OrderDetails, OrderItemDetails};
pub use order_item::OrderItem;
pub use product::{Category, Condition, Product, ProductStatus, ProductWithOwner};
pub use user::{OwnerSummary, PublicUser, User};
