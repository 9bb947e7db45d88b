use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::{Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::product::{Category, Condition, Product, ProductOwnerRow, ProductStatus, ProductWithOwner};
use crate::models::user::OwnerSummary;
use crate::services::listing_service;
use crate::state::AppState;
use crate::validation::Validator;
use crate::web::extractors::AuthenticatedUser;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 50;

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
  #[default]
  Newest,
  Oldest,
  PriceLow,
  PriceHigh,
  Title,
}

impl SortOrder {
  fn clause(self) -> &'static str {
    match self {
      SortOrder::Newest => " ORDER BY p.created_at DESC",
      SortOrder::Oldest => " ORDER BY p.created_at ASC",
      SortOrder::PriceLow => " ORDER BY p.price_cents ASC",
      SortOrder::PriceHigh => " ORDER BY p.price_cents DESC",
      SortOrder::Title => " ORDER BY p.title ASC",
    }
  }
}

#[derive(Deserialize, Debug, Default)]
pub struct ListProductsQuery {
  /// Free-text substring filter. `search` and `q` are accepted aliases.
  #[serde(alias = "search")]
  pub q: Option<String>,
  pub category: Option<Category>,
  #[serde(default)]
  pub sort: SortOrder,
  pub page: Option<i64>,
  pub limit: Option<i64>,
}

fn page_window(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> (i64, i64, i64) {
  let page = page.unwrap_or(1).max(1);
  let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
  (page, limit, (page - 1) * limit)
}

/// Appends the shared WHERE filters to both the page and the count query.
///
/// The substring match is deliberately case-sensitive (`LIKE`, not `ILIKE`),
/// matching the behavior the service has always had.
fn push_search_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, query: &'a ListProductsQuery) {
  qb.push(" WHERE p.status = ").push_bind(ProductStatus::Available);

  if let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) {
    let pattern = format!("%{}%", q);
    qb.push(" AND (");
    let mut first = true;
    for column in [
      "p.title",
      "p.description",
      "p.brand",
      "p.color",
      "p.material",
      "p.location",
    ] {
      if !first {
        qb.push(" OR ");
      }
      first = false;
      qb.push(column).push(" LIKE ").push_bind(pattern.clone());
    }
    qb.push(")");
  }

  if let Some(category) = query.category {
    qb.push(" AND p.category = ").push_bind(category);
  }
}

#[instrument(name = "handler::list_products", skip(app_state, query))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let (page, limit, offset) = page_window(query.page, query.limit, DEFAULT_PAGE_SIZE);

  let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
    "SELECT p.*, u.username AS owner_username, u.email AS owner_email \
     FROM products p JOIN users u ON u.id = p.owner_id",
  );
  push_search_filters(&mut qb, &query);
  qb.push(query.sort.clause());
  qb.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);

  let rows: Vec<ProductOwnerRow> = qb.build_query_as().fetch_all(&app_state.db_pool).await?;
  let products: Vec<ProductWithOwner> = rows.into_iter().map(ProductWithOwner::from).collect();

  let mut count_qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM products p");
  push_search_filters(&mut count_qb, &query);
  let total: i64 = count_qb.build_query_scalar().fetch_one(&app_state.db_pool).await?;

  info!(returned = products.len(), total, "Listed products.");

  Ok(HttpResponse::Ok().json(json!({
      "products": products,
      "pagination": {
          "page": page,
          "limit": limit,
          "total": total,
          "pages": (total + limit - 1) / limit,
      }
  })))
}

#[derive(Deserialize, Debug)]
pub struct CreateProductPayload {
  pub title: String,
  pub description: String,
  pub category: Category,
  pub price_cents: i64,
  #[serde(default)]
  pub condition: Option<Condition>,
  pub image_url: Option<String>,
  pub brand: Option<String>,
  pub size: Option<String>,
  pub color: Option<String>,
  pub material: Option<String>,
  pub location: Option<String>,
  pub weight: Option<String>,
  pub dimensions: Option<String>,
  pub year_purchased: Option<i32>,
}

fn validate_product_fields(v: &mut Validator, p: &CreateProductPayload) {
  v.check(!p.title.is_empty(), "title", "Title is required");
  v.check(
    p.title.chars().count() <= 100,
    "title",
    "Title must be less than 100 characters",
  );
  v.check(!p.description.is_empty(), "description", "Description is required");
  v.check(
    p.description.chars().count() <= 1000,
    "description",
    "Description must be less than 1000 characters",
  );
  v.check(p.price_cents > 0, "price_cents", "Price must be positive");
  if let Some(url) = p.image_url.as_deref().filter(|u| !u.is_empty()) {
    v.url("image_url", url);
  }
  for (field, value, max) in [
    ("brand", &p.brand, 50usize),
    ("size", &p.size, 20),
    ("color", &p.color, 30),
    ("material", &p.material, 50),
    ("location", &p.location, 50),
    ("weight", &p.weight, 20),
    ("dimensions", &p.dimensions, 50),
  ] {
    if let Some(value) = value {
      v.check(
        value.chars().count() <= max,
        field,
        &format!("{} must be less than {} characters", capitalize(field), max),
      );
    }
  }
  if let Some(year) = p.year_purchased {
    v.check((1900..=3000).contains(&year), "year_purchased", "Invalid year");
  }
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    None => String::new(),
  }
}

#[instrument(name = "handler::create_product", skip(app_state, payload, auth), fields(user_id = %auth.user.id))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateProductPayload>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let mut v = Validator::new();
  validate_product_fields(&mut v, &payload);
  v.finish()?;

  let product: Product = sqlx::query_as(
    "INSERT INTO products (id, title, description, category, price_cents, condition, status, owner_id, \
       image_url, brand, size, color, material, location, weight, dimensions, year_purchased) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
     RETURNING *",
  )
  .bind(Uuid::new_v4())
  .bind(&payload.title)
  .bind(&payload.description)
  .bind(payload.category)
  .bind(payload.price_cents)
  .bind(payload.condition.unwrap_or(Condition::Good))
  .bind(ProductStatus::Available)
  .bind(auth.user.id)
  .bind(&payload.image_url)
  .bind(&payload.brand)
  .bind(&payload.size)
  .bind(&payload.color)
  .bind(&payload.material)
  .bind(&payload.location)
  .bind(&payload.weight)
  .bind(&payload.dimensions)
  .bind(payload.year_purchased)
  .fetch_one(&app_state.db_pool)
  .await?;

  info!(product_id = %product.id, "Product created.");

  let owner = OwnerSummary {
    id: auth.user.id,
    username: auth.user.username.clone(),
    email: auth.user.email.clone(),
  };
  Ok(HttpResponse::Created().json(json!({
      "product": ProductWithOwner { product, owner },
      "message": "Product created successfully"
  })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let product = listing_service::product_with_owner(&app_state.db_pool, product_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateProductPayload {
  pub title: Option<String>,
  pub description: Option<String>,
  pub category: Option<Category>,
  pub price_cents: Option<i64>,
  pub condition: Option<Condition>,
  pub image_url: Option<String>,
  pub brand: Option<String>,
  pub size: Option<String>,
  pub color: Option<String>,
  pub material: Option<String>,
  pub location: Option<String>,
  pub weight: Option<String>,
  pub dimensions: Option<String>,
  pub year_purchased: Option<i32>,
}

fn validate_product_update(p: &UpdateProductPayload) -> Result<(), AppError> {
  let mut v = Validator::new();
  if let Some(title) = &p.title {
    v.check(!title.is_empty(), "title", "Title is required");
    v.check(
      title.chars().count() <= 100,
      "title",
      "Title must be less than 100 characters",
    );
  }
  if let Some(description) = &p.description {
    v.check(!description.is_empty(), "description", "Description is required");
    v.check(
      description.chars().count() <= 1000,
      "description",
      "Description must be less than 1000 characters",
    );
  }
  if let Some(price) = p.price_cents {
    v.check(price > 0, "price_cents", "Price must be positive");
  }
  if let Some(url) = p.image_url.as_deref().filter(|u| !u.is_empty()) {
    v.url("image_url", url);
  }
  if let Some(year) = p.year_purchased {
    v.check((1900..=3000).contains(&year), "year_purchased", "Invalid year");
  }
  v.finish()
}

#[instrument(name = "handler::update_product", skip(app_state, path, payload, auth), fields(user_id = %auth.user.id))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateProductPayload>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();

  let existing: Option<Product> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
    .bind(product_id)
    .fetch_optional(&app_state.db_pool)
    .await?;
  let existing = existing.ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
  if existing.owner_id != auth.user.id {
    return Err(AppError::Forbidden(
      "You can only edit your own products".to_string(),
    ));
  }

  validate_product_update(&payload)?;

  let product: Product = sqlx::query_as(
    "UPDATE products SET \
       title = COALESCE($1, title), \
       description = COALESCE($2, description), \
       category = COALESCE($3, category), \
       price_cents = COALESCE($4, price_cents), \
       condition = COALESCE($5, condition), \
       image_url = COALESCE($6, image_url), \
       brand = COALESCE($7, brand), \
       size = COALESCE($8, size), \
       color = COALESCE($9, color), \
       material = COALESCE($10, material), \
       location = COALESCE($11, location), \
       weight = COALESCE($12, weight), \
       dimensions = COALESCE($13, dimensions), \
       year_purchased = COALESCE($14, year_purchased), \
       updated_at = now() \
     WHERE id = $15 \
     RETURNING *",
  )
  .bind(&payload.title)
  .bind(&payload.description)
  .bind(payload.category)
  .bind(payload.price_cents)
  .bind(payload.condition)
  .bind(&payload.image_url)
  .bind(&payload.brand)
  .bind(&payload.size)
  .bind(&payload.color)
  .bind(&payload.material)
  .bind(&payload.location)
  .bind(&payload.weight)
  .bind(&payload.dimensions)
  .bind(payload.year_purchased)
  .bind(product_id)
  .fetch_one(&app_state.db_pool)
  .await?;

  info!(product_id = %product.id, "Product updated.");

  let owner = OwnerSummary {
    id: auth.user.id,
    username: auth.user.username.clone(),
    email: auth.user.email.clone(),
  };
  Ok(HttpResponse::Ok().json(json!({
      "product": ProductWithOwner { product, owner },
      "message": "Product updated successfully"
  })))
}

#[instrument(name = "handler::delete_product", skip(app_state, path, auth), fields(user_id = %auth.user.id))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();

  let existing: Option<Product> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
    .bind(product_id)
    .fetch_optional(&app_state.db_pool)
    .await?;
  let existing = existing.ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
  if existing.owner_id != auth.user.id {
    return Err(AppError::Forbidden(
      "You can only delete your own products".to_string(),
    ));
  }

  sqlx::query("DELETE FROM products WHERE id = $1")
    .bind(product_id)
    .execute(&app_state.db_pool)
    .await?;

  info!(product_id = %product_id, "Product deleted.");

  Ok(HttpResponse::Ok().json(json!({"message": "Product deleted successfully"})))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sort_clauses_cover_every_order() {
    assert_eq!(SortOrder::Newest.clause(), " ORDER BY p.created_at DESC");
    assert_eq!(SortOrder::Oldest.clause(), " ORDER BY p.created_at ASC");
    assert_eq!(SortOrder::PriceLow.clause(), " ORDER BY p.price_cents ASC");
    assert_eq!(SortOrder::PriceHigh.clause(), " ORDER BY p.price_cents DESC");
    assert_eq!(SortOrder::Title.clause(), " ORDER BY p.title ASC");
  }

  #[test]
  fn sort_order_parses_kebab_case() {
    let q: ListProductsQuery = serde_json::from_str(r#"{"sort": "price-low"}"#).unwrap();
    assert_eq!(q.sort, SortOrder::PriceLow);
    let q: ListProductsQuery = serde_json::from_str("{}").unwrap();
    assert_eq!(q.sort, SortOrder::Newest);
  }

  #[test]
  fn page_window_defaults_and_clamps() {
    assert_eq!(page_window(None, None, 20), (1, 20, 0));
    assert_eq!(page_window(Some(3), Some(10), 20), (3, 10, 20));
    // limit is capped and floored; page floors at 1
    assert_eq!(page_window(Some(0), Some(500), 20), (1, MAX_PAGE_SIZE, 0));
    assert_eq!(page_window(Some(2), Some(0), 20), (2, 1, 1));
  }

  #[test]
  fn search_filters_use_case_sensitive_like_over_text_columns() {
    let query = ListProductsQuery {
      q: Some("Bike".into()),
      category: Some(Category::Other),
      ..Default::default()
    };
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM products p");
    push_search_filters(&mut qb, &query);
    let sql = qb.sql();
    assert!(sql.contains("p.title LIKE"), "{sql}");
    assert!(sql.contains("p.location LIKE"), "{sql}");
    assert!(!sql.contains("ILIKE"), "{sql}");
    assert!(sql.contains("p.category ="), "{sql}");
  }

  #[test]
  fn blank_search_adds_no_text_filter() {
    let query = ListProductsQuery {
      q: Some(String::new()),
      ..Default::default()
    };
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM products p");
    push_search_filters(&mut qb, &query);
    assert!(!qb.sql().contains("LIKE"));
  }

  #[test]
  fn product_field_validation_flags_oversized_fields() {
    let payload = CreateProductPayload {
      title: "x".repeat(101),
      description: String::new(),
      category: Category::Books,
      price_cents: 0,
      condition: None,
      image_url: Some("ftp://nope".into()),
      brand: Some("b".repeat(51)),
      size: None,
      color: None,
      material: None,
      location: None,
      weight: None,
      dimensions: None,
      year_purchased: Some(1492),
    };
    let mut v = Validator::new();
    validate_product_fields(&mut v, &payload);
    match v.finish().unwrap_err() {
      AppError::InvalidInput(details) => {
        let fields: Vec<_> = details.iter().map(|d| d.field).collect();
        for expected in ["title", "description", "price_cents", "image_url", "brand", "year_purchased"] {
          assert!(fields.contains(&expected), "missing {expected}: {fields:?}");
        }
      }
      other => panic!("expected InvalidInput, got {other}"),
    }
  }
}
