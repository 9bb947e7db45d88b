use crate::models::product::ProductWithOwner;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartItem {
  pub id: Uuid,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub created_at: DateTime<Utc>,
}

/// A cart item with its product (and the product's owner) nested, as
/// returned by the cart endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemDetails {
  #[serde(flatten)]
  pub item: CartItem,
  pub product: ProductWithOwner,
}
