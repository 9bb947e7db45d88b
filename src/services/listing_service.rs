//! Shared loaders for products joined with their owner's public summary.

use crate::errors::Result;
use crate::models::product::{ProductOwnerRow, ProductWithOwner};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const PRODUCT_OWNER_SELECT: &str = "SELECT p.*, u.username AS owner_username, u.email AS owner_email \
   FROM products p JOIN users u ON u.id = p.owner_id";

/// Loads one product with its owner nested, or `None` if it does not exist.
pub async fn product_with_owner(pool: &PgPool, product_id: Uuid) -> Result<Option<ProductWithOwner>> {
  let row: Option<ProductOwnerRow> = sqlx::query_as(&format!("{PRODUCT_OWNER_SELECT} WHERE p.id = $1"))
    .bind(product_id)
    .fetch_optional(pool)
    .await?;
  Ok(row.map(ProductWithOwner::from))
}

/// Loads a batch of products keyed by id, for nesting under cart items and
/// order items.
pub async fn products_with_owners(pool: &PgPool, ids: &[Uuid]) -> Result<HashMap<Uuid, ProductWithOwner>> {
  if ids.is_empty() {
    return Ok(HashMap::new());
  }
  let rows: Vec<ProductOwnerRow> = sqlx::query_as(&format!("{PRODUCT_OWNER_SELECT} WHERE p.id = ANY($1)"))
    .bind(ids)
    .fetch_all(pool)
    .await?;
  Ok(
    rows
      .into_iter()
      .map(|row| {
        let p = ProductWithOwner::from(row);
        (p.product.id, p)
      })
      .collect(),
  )
}
