use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::cart_item::{CartItem, CartItemDetails};
use crate::models::product::{Product, ProductStatus};
use crate::services::listing_service;
use crate::state::AppState;
use crate::validation::Validator;
use crate::web::extractors::AuthenticatedUser;

// --- Request DTO ---
#[derive(Deserialize, Debug)]
pub struct AddToCartPayload {
  pub product_id: Uuid,
  #[serde(default = "default_quantity")]
  pub quantity: i32,
}

fn default_quantity() -> i32 {
  1
}

#[instrument(name = "handler::get_cart", skip(app_state, auth), fields(user_id = %auth.user.id))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let items: Vec<CartItem> = sqlx::query_as("SELECT * FROM cart_items WHERE user_id = $1 ORDER BY created_at DESC")
    .bind(auth.user.id)
    .fetch_all(&app_state.db_pool)
    .await?;

  let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
  let products = listing_service::products_with_owners(&app_state.db_pool, &product_ids).await?;

  let mut details = Vec::with_capacity(items.len());
  let mut total_cents: i64 = 0;
  for item in items {
    let product = products
      .get(&item.product_id)
      .cloned()
      .ok_or_else(|| AppError::Internal(format!("Cart item {} references a missing product", item.id)))?;
    total_cents += product.product.price_cents * i64::from(item.quantity);
    details.push(CartItemDetails { item, product });
  }

  let count = details.len();
  Ok(HttpResponse::Ok().json(json!({
      "items": details,
      "total_cents": total_cents,
      "count": count
  })))
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, payload, auth),
    fields(user_id = %auth.user.id, product_id = %payload.product_id, quantity = %payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<AddToCartPayload>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let mut v = Validator::new();
  v.check(payload.quantity >= 1, "quantity", "Quantity must be at least 1");
  v.finish()?;

  let product: Option<Product> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
    .bind(payload.product_id)
    .fetch_optional(&app_state.db_pool)
    .await?;
  let product = product.ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

  if product.status != ProductStatus::Available {
    warn!("Add to cart rejected: product not available.");
    return Err(AppError::Validation("Product is not available".to_string()));
  }
  if product.owner_id == auth.user.id {
    warn!("Add to cart rejected: self-purchase.");
    return Err(AppError::Validation(
      "You cannot add your own product to cart".to_string(),
    ));
  }

  // Upsert on the (user, product) pair: a second add increments quantity
  // instead of duplicating the row.
  let item: CartItem = sqlx::query_as(
    "INSERT INTO cart_items (id, user_id, product_id, quantity) VALUES ($1, $2, $3, $4) \
     ON CONFLICT (user_id, product_id) \
     DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity \
     RETURNING *",
  )
  .bind(Uuid::new_v4())
  .bind(auth.user.id)
  .bind(payload.product_id)
  .bind(payload.quantity)
  .fetch_one(&app_state.db_pool)
  .await?;

  info!(cart_item_id = %item.id, new_quantity = item.quantity, "Item added to cart.");

  let product = listing_service::product_with_owner(&app_state.db_pool, item.product_id)
    .await?
    .ok_or_else(|| AppError::Internal("Product vanished while adding to cart".to_string()))?;

  Ok(HttpResponse::Created().json(json!({
      "item": CartItemDetails { item, product },
      "message": "Item added to cart successfully"
  })))
}

#[instrument(
    name = "handler::remove_from_cart",
    skip(app_state, path, auth),
    fields(user_id = %auth.user.id, cart_item_id = %path.as_ref())
)]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let cart_item_id = path.into_inner();

  let item: Option<CartItem> = sqlx::query_as("SELECT * FROM cart_items WHERE id = $1")
    .bind(cart_item_id)
    .fetch_optional(&app_state.db_pool)
    .await?;
  let item = item.ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))?;

  if item.user_id != auth.user.id {
    return Err(AppError::Forbidden(
      "You can only remove your own cart items".to_string(),
    ));
  }

  sqlx::query("DELETE FROM cart_items WHERE id = $1")
    .bind(cart_item_id)
    .execute(&app_state.db_pool)
    .await?;

  info!("Cart item removed.");

  Ok(HttpResponse::Ok().json(json!({"message": "Item removed from cart successfully"})))
}
