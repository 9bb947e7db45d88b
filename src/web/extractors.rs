//! Request-scoped authentication.

use crate::errors::AppError;
use crate::models::user::User;
use crate::services::auth_service::{self, TokenType};
use crate::state::AppState;
use crate::web::cookies::ACCESS_TOKEN_COOKIE;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

/// The user identified by a valid `accessToken` cookie.
///
/// Verifies the token's signature, expiry and `access` type tag, then loads
/// the user row so handlers always see current profile data. Every failure
/// mode collapses to a 401; mutating endpoints layer their own 403 ownership
/// checks on top.
#[derive(Debug)]
pub struct AuthenticatedUser {
  pub user: User,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let req = req.clone();
    Box::pin(async move {
      let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("AppState not configured".to_string()))?;

      let cookie = req
        .cookie(ACCESS_TOKEN_COOKIE)
        .ok_or_else(|| AppError::Auth("Unauthorized".to_string()))?;

      let claims = auth_service::verify_token(&state.config, cookie.value(), TokenType::Access)
        .map_err(|_| AppError::Auth("Unauthorized".to_string()))?;

      let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(claims.sub)
        .fetch_optional(&state.db_pool)
        .await?;

      user.map(|user| AuthenticatedUser { user }).ok_or_else(|| {
        warn!(user_id = %claims.sub, "Valid access token for a user that no longer exists.");
        AppError::Auth("Unauthorized".to_string())
      })
    })
  }
}
