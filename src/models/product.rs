use crate::models::user::OwnerSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "product_category_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Clothing,
  Electronics,
  Furniture,
  Books,
  Accessories,
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "product_condition_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Condition {
  Excellent,
  Good,
  Fair,
  Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "product_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
  Available,
  Sold,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub title: String,
  pub description: String,
  pub category: Category,
  /// Integer cents; the checkout total is exact arithmetic over these.
  pub price_cents: i64,
  pub condition: Condition,
  pub status: ProductStatus,
  pub owner_id: Uuid,
  pub image_url: Option<String>,
  pub brand: Option<String>,
  pub size: Option<String>,
  pub color: Option<String>,
  pub material: Option<String>,
  pub location: Option<String>,
  pub weight: Option<String>,
  pub dimensions: Option<String>,
  pub year_purchased: Option<i32>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A product joined with its owner's public summary, as returned by the API.
///
/// `ProductOwnerRow` is the flat row shape for queries of the form
/// `SELECT p.*, u.username AS owner_username, u.email AS owner_email ...`.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithOwner {
  #[serde(flatten)]
  pub product: Product,
  pub owner: OwnerSummary,
}

#[derive(Debug, FromRow)]
pub struct ProductOwnerRow {
  #[sqlx(flatten)]
  pub product: Product,
  pub owner_username: Option<String>,
  pub owner_email: String,
}

impl From<ProductOwnerRow> for ProductWithOwner {
  fn from(row: ProductOwnerRow) -> Self {
    let owner = OwnerSummary {
      id: row.product.owner_id,
      username: row.owner_username,
      email: row.owner_email,
    };
    Self {
      product: row.product,
      owner,
    }
  }
}
