use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::checkout_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

const DEFAULT_ORDERS_PAGE_SIZE: i64 = 10;
const MAX_ORDERS_PAGE_SIZE: i64 = 50;

/// `POST /orders` — the checkout endpoint. The heavy lifting (row locks,
/// atomicity, rollback) lives in `checkout_service`.
#[instrument(name = "handler::create_order", skip(app_state, auth), fields(user_id = %auth.user.id))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = checkout_service::checkout(&app_state.db_pool, auth.user.id).await?;

  info!(order_id = %order.order.id, total_cents = order.order.total_cents, "Order created.");

  Ok(HttpResponse::Created().json(json!({
      "order": order,
      "message": "Order created successfully"
  })))
}

#[derive(Deserialize, Debug, Default)]
pub struct MyOrdersQuery {
  pub page: Option<i64>,
  pub limit: Option<i64>,
}

#[instrument(name = "handler::my_orders", skip(app_state, query, auth), fields(user_id = %auth.user.id))]
pub async fn my_orders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<MyOrdersQuery>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let page = query.page.unwrap_or(1).max(1);
  let limit = query
    .limit
    .unwrap_or(DEFAULT_ORDERS_PAGE_SIZE)
    .clamp(1, MAX_ORDERS_PAGE_SIZE);
  let offset = (page - 1) * limit;

  let (orders, total) = checkout_service::orders_for_buyer(&app_state.db_pool, auth.user.id, limit, offset).await?;

  Ok(HttpResponse::Ok().json(json!({
      "orders": orders,
      "pagination": {
          "page": page,
          "limit": limit,
          "total": total,
          "pages": (total + limit - 1) / limit,
      }
  })))
}
