use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
  pub id: Uuid,
  pub email: String,
  #[serde(skip_serializing)] // Never send the password hash to a client
  pub password_hash: String,
  pub username: Option<String>,
  pub avatar_url: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// The authenticated user's own profile, as returned by the auth and
/// `/users/me` endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
  pub id: Uuid,
  pub email: String,
  pub username: Option<String>,
  pub avatar_url: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
  fn from(u: User) -> Self {
    Self {
      id: u.id,
      email: u.email,
      username: u.username,
      avatar_url: u.avatar_url,
      created_at: u.created_at,
    }
  }
}

/// The slim owner view nested inside product responses.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerSummary {
  pub id: Uuid,
  pub username: Option<String>,
  pub email: String,
}
