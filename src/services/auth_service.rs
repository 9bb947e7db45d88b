//! Password hashing and signed-token issuance/verification.
//!
//! Passwords use Argon2 with per-hash random salts. Sessions are two
//! stateless HS256 tokens: a short-lived access token and a longer-lived
//! refresh token, told apart by the `token_type` claim so one can never be
//! replayed as the other.

use crate::config::AppConfig;
use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Hashes a plain-text password using Argon2.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation(
      "Password cannot be empty for hashing.".to_string(),
    ));
  }

  let salt = SaltString::generate(&mut OsRng);
  let argon2_hasher = Argon2::default();

  argon2_hasher
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| AppError::Internal(format!("Password hashing process failed: {}", e)))
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// Returns `Ok(false)` on a mismatch; `Err` only for malformed hashes or
/// internal verifier failures.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password_str)
    .map_err(|e| AppError::Internal(format!("Invalid stored password hash format: {}", e)))?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(e) => Err(AppError::Internal(format!(
      "Password verification process failed: {}",
      e
    ))),
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
  Access,
  Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// The user id.
  pub sub: Uuid,
  pub email: String,
  pub token_type: TokenType,
  pub iat: i64,
  pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
  pub access_token: String,
  pub refresh_token: String,
}

/// Issues a fresh access + refresh token pair for the user.
#[instrument(name = "auth_service::generate_tokens", skip(config), fields(user_id = %user_id))]
pub fn generate_tokens(config: &AppConfig, user_id: Uuid, email: &str) -> Result<TokenPair, AppError> {
  let access_token = sign_token(
    config,
    user_id,
    email,
    TokenType::Access,
    config.access_token_ttl_secs,
  )?;
  let refresh_token = sign_token(
    config,
    user_id,
    email,
    TokenType::Refresh,
    config.refresh_token_ttl_secs,
  )?;
  debug!("Issued access and refresh tokens.");
  Ok(TokenPair {
    access_token,
    refresh_token,
  })
}

fn sign_token(
  config: &AppConfig,
  user_id: Uuid,
  email: &str,
  token_type: TokenType,
  ttl_secs: i64,
) -> Result<String, AppError> {
  let now = Utc::now().timestamp();
  let claims = Claims {
    sub: user_id,
    email: email.to_string(),
    token_type,
    iat: now,
    exp: now + ttl_secs,
  };
  encode(
    &Header::default(),
    &claims,
    &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
  )
  .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
}

/// Verifies signature and expiry, and that the token carries the expected
/// type tag. Any failure collapses to `AppError::Auth`.
#[instrument(name = "auth_service::verify_token", skip(config, token))]
pub fn verify_token(config: &AppConfig, token: &str, expected: TokenType) -> Result<Claims, AppError> {
  let mut validation = Validation::default();
  validation.leeway = 0;

  let data = decode::<Claims>(
    token,
    &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
    &validation,
  )
  .map_err(|e| {
    debug!(error = %e, "Token verification failed.");
    AppError::Auth("Invalid or expired token".to_string())
  })?;

  if data.claims.token_type != expected {
    return Err(AppError::Auth("Invalid or expired token".to_string()));
  }
  Ok(data.claims)
}
