//! The checkout unit of work: converts a user's cart into a durable order
//! while preventing sale of unavailable inventory and leaving no partial
//! state on failure.
//!
//! All reads and writes happen inside one `sqlx::Transaction`. The cart's
//! product rows are locked `FOR UPDATE` up front, so two concurrent
//! checkouts referencing the same listing serialize: the second transaction
//! blocks on the row lock and, once the first commits, observes the product
//! as sold and fails before mutating anything. An error anywhere before
//! commit drops the transaction and rolls everything back.

use crate::errors::AppError;
use crate::models::order::{Order, OrderDetails, OrderItemDetails};
use crate::models::order_item::OrderItem;
use crate::models::product::ProductStatus;
use crate::services::listing_service;
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CheckoutError {
  #[error("Cart is empty")]
  EmptyCart,

  #[error("Product \"{title}\" is no longer available")]
  ProductUnavailable { title: String },

  #[error(transparent)]
  Db(#[from] sqlx::Error),
}

impl From<CheckoutError> for AppError {
  fn from(err: CheckoutError) -> Self {
    match err {
      CheckoutError::EmptyCart | CheckoutError::ProductUnavailable { .. } => AppError::Validation(err.to_string()),
      CheckoutError::Db(e) => AppError::Sqlx(e),
    }
  }
}

/// One cart row joined with the product fields checkout needs, read under a
/// row lock on the product.
#[derive(Debug, FromRow)]
pub(crate) struct CartLine {
  pub product_id: Uuid,
  pub quantity: i32,
  pub price_cents: i64,
  pub title: String,
  pub status: ProductStatus,
}

/// Σ(price × quantity) over the lines, in cents.
pub(crate) fn order_total(lines: &[CartLine]) -> i64 {
  lines.iter().map(|l| l.price_cents * i64::from(l.quantity)).sum()
}

/// Fails on the first line whose product is not Available, naming its title.
pub(crate) fn ensure_all_available(lines: &[CartLine]) -> Result<(), CheckoutError> {
  match lines.iter().find(|l| l.status != ProductStatus::Available) {
    Some(line) => Err(CheckoutError::ProductUnavailable {
      title: line.title.clone(),
    }),
    None => Ok(()),
  }
}

/// Runs the checkout transaction for `buyer_id` and returns the complete
/// order with nested items, products and owners.
#[instrument(name = "checkout_service::checkout", skip(pool), fields(buyer_id = %buyer_id))]
pub async fn checkout(pool: &PgPool, buyer_id: Uuid) -> Result<OrderDetails, AppError> {
  let mut tx = pool.begin().await.map_err(CheckoutError::Db)?;

  // Lock the product rows for the whole transaction. FOR UPDATE OF p leaves
  // the cart_items rows unlocked; only product state is contended.
  let lines: Vec<CartLine> = sqlx::query_as(
    "SELECT ci.product_id, ci.quantity, p.price_cents, p.title, p.status \
     FROM cart_items ci JOIN products p ON p.id = ci.product_id \
     WHERE ci.user_id = $1 \
     ORDER BY ci.created_at \
     FOR UPDATE OF p",
  )
  .bind(buyer_id)
  .fetch_all(&mut *tx)
  .await
  .map_err(CheckoutError::Db)?;

  if lines.is_empty() {
    return Err(CheckoutError::EmptyCart.into());
  }
  ensure_all_available(&lines)?;

  let total_cents = order_total(&lines);
  let order_id = Uuid::new_v4();

  sqlx::query("INSERT INTO orders (id, buyer_id, total_cents) VALUES ($1, $2, $3)")
    .bind(order_id)
    .bind(buyer_id)
    .bind(total_cents)
    .execute(&mut *tx)
    .await
    .map_err(CheckoutError::Db)?;

  for line in &lines {
    sqlx::query("INSERT INTO order_items (id, order_id, product_id, price_cents, quantity) VALUES ($1, $2, $3, $4, $5)")
      .bind(Uuid::new_v4())
      .bind(order_id)
      .bind(line.product_id)
      .bind(line.price_cents)
      .bind(line.quantity)
      .execute(&mut *tx)
      .await
      .map_err(CheckoutError::Db)?;

    sqlx::query("UPDATE products SET status = $1, updated_at = now() WHERE id = $2")
      .bind(ProductStatus::Sold)
      .bind(line.product_id)
      .execute(&mut *tx)
      .await
      .map_err(CheckoutError::Db)?;
  }

  sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
    .bind(buyer_id)
    .execute(&mut *tx)
    .await
    .map_err(CheckoutError::Db)?;

  tx.commit().await.map_err(CheckoutError::Db)?;

  info!(order_id = %order_id, total_cents, items = lines.len(), "Checkout committed.");

  // Committed; re-read the order in its response shape.
  fetch_order_details(pool, order_id)
    .await?
    .ok_or_else(|| AppError::Internal("Order vanished immediately after commit".to_string()))
}

/// Loads one order with nested items → products → owners.
pub async fn fetch_order_details(pool: &PgPool, order_id: Uuid) -> Result<Option<OrderDetails>, AppError> {
  let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE id = $1")
    .bind(order_id)
    .fetch_optional(pool)
    .await?;
  let Some(order) = order else {
    return Ok(None);
  };
  let mut details = assemble_order_details(pool, vec![order]).await?;
  Ok(details.pop())
}

/// Loads a page of the buyer's orders, newest first, with nested detail.
/// Returns the page plus the buyer's total order count.
pub async fn orders_for_buyer(
  pool: &PgPool,
  buyer_id: Uuid,
  limit: i64,
  offset: i64,
) -> Result<(Vec<OrderDetails>, i64), AppError> {
  let orders: Vec<Order> =
    sqlx::query_as("SELECT * FROM orders WHERE buyer_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3")
      .bind(buyer_id)
      .bind(limit)
      .bind(offset)
      .fetch_all(pool)
      .await?;
  let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE buyer_id = $1")
    .bind(buyer_id)
    .fetch_one(pool)
    .await?;

  let details = assemble_order_details(pool, orders).await?;
  Ok((details, total))
}

async fn assemble_order_details(pool: &PgPool, orders: Vec<Order>) -> Result<Vec<OrderDetails>, AppError> {
  if orders.is_empty() {
    return Ok(Vec::new());
  }
  let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

  let items: Vec<OrderItem> = sqlx::query_as("SELECT * FROM order_items WHERE order_id = ANY($1)")
    .bind(&order_ids)
    .fetch_all(pool)
    .await?;

  let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
  let products = listing_service::products_with_owners(pool, &product_ids).await?;

  let mut by_order: std::collections::HashMap<Uuid, Vec<OrderItemDetails>> = std::collections::HashMap::new();
  for item in items {
    let product = products
      .get(&item.product_id)
      .cloned()
      .ok_or_else(|| AppError::Internal(format!("Order item {} references a missing product", item.id)))?;
    by_order.entry(item.order_id).or_default().push(OrderItemDetails { item, product });
  }

  Ok(
    orders
      .into_iter()
      .map(|order| {
        let items = by_order.remove(&order.id).unwrap_or_default();
        OrderDetails { order, items }
      })
      .collect(),
  )
}
