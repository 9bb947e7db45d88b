use crate::models::order_item::OrderItem;
use crate::models::product::ProductWithOwner;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Created only by checkout; immutable afterward.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub buyer_id: Uuid,
  pub total_cents: i64,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItemDetails {
  #[serde(flatten)]
  pub item: OrderItem,
  pub product: ProductWithOwner,
}

/// A complete order with nested items, products and owners.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderItemDetails>,
}
