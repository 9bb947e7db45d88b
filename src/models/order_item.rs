use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Immutable order line; `price_cents` is the snapshot taken at purchase
/// time and never follows later product edits.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub price_cents: i64,
  pub quantity: i32,
}
