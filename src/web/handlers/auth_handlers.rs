use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::user::{PublicUser, User};
use crate::services::auth_service::{self, TokenType};
use crate::state::AppState;
use crate::validation::Validator;
use crate::web::cookies::{self, REFRESH_TOKEN_COOKIE};

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
pub struct SignupRequestPayload {
  pub email: String,
  pub password: String,
  pub username: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: String,
}

fn validate_signup(payload: &SignupRequestPayload) -> Result<(), AppError> {
  let mut v = Validator::new();
  v.email("email", &payload.email);
  v.check(
    payload.password.len() >= 8,
    "password",
    "Password must be at least 8 characters",
  );
  if let Some(username) = &payload.username {
    v.check(
      username.chars().count() >= 2,
      "username",
      "Username must be at least 2 characters",
    );
  }
  v.finish()
}

// --- Handler Implementations ---

#[instrument(
    name = "handler::signup",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email)
)]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignupRequestPayload>,
) -> Result<HttpResponse, AppError> {
  validate_signup(&req_payload)?;

  let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
    .bind(&req_payload.email)
    .fetch_optional(&app_state.db_pool)
    .await?;
  if existing.is_some() {
    warn!("Signup rejected: email already registered.");
    return Err(AppError::Validation(
      "User with this email already exists".to_string(),
    ));
  }

  let password_hash = auth_service::hash_password(&req_payload.password)?;

  let user: User = sqlx::query_as(
    "INSERT INTO users (id, email, password_hash, username) VALUES ($1, $2, $3, $4) RETURNING *",
  )
  .bind(uuid::Uuid::new_v4())
  .bind(&req_payload.email)
  .bind(&password_hash)
  .bind(&req_payload.username)
  .fetch_one(&app_state.db_pool)
  .await?;

  info!(user_id = %user.id, "User created.");

  let tokens = auth_service::generate_tokens(&app_state.config, user.id, &user.email)?;
  let (access_cookie, refresh_cookie) = cookies::auth_cookies(&app_state.config, &tokens);

  Ok(
    HttpResponse::Created()
      .cookie(access_cookie)
      .cookie(refresh_cookie)
      .json(json!({
          "user": PublicUser::from(user),
          "message": "User created successfully"
      })),
  )
}

#[instrument(
    name = "handler::login",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email)
)]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let mut v = Validator::new();
  v.email("email", &req_payload.email);
  v.check(!req_payload.password.is_empty(), "password", "Password is required");
  v.finish()?;

  let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
    .bind(&req_payload.email)
    .fetch_optional(&app_state.db_pool)
    .await?;

  // Unknown email and bad password answer identically.
  let invalid = || AppError::Auth("Invalid email or password".to_string());
  let user = user.ok_or_else(invalid)?;
  if !auth_service::verify_password(&user.password_hash, &req_payload.password)? {
    warn!(user_id = %user.id, "Login rejected: password mismatch.");
    return Err(invalid());
  }

  info!(user_id = %user.id, "Login successful.");

  let tokens = auth_service::generate_tokens(&app_state.config, user.id, &user.email)?;
  let (access_cookie, refresh_cookie) = cookies::auth_cookies(&app_state.config, &tokens);

  Ok(
    HttpResponse::Ok()
      .cookie(access_cookie)
      .cookie(refresh_cookie)
      .json(json!({
          "user": PublicUser::from(user),
          "message": "Login successful"
      })),
  )
}

#[instrument(name = "handler::refresh", skip(app_state, req))]
pub async fn refresh_handler(app_state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
  let cookie = req
    .cookie(REFRESH_TOKEN_COOKIE)
    .ok_or_else(|| AppError::Auth("Refresh token not found".to_string()))?;

  let claims = auth_service::verify_token(&app_state.config, cookie.value(), TokenType::Refresh)
    .map_err(|_| AppError::Auth("Invalid refresh token".to_string()))?;

  // The account may have been deleted since the token was issued.
  let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
    .bind(claims.sub)
    .fetch_optional(&app_state.db_pool)
    .await?;
  let user = user.ok_or_else(|| AppError::Auth("User not found".to_string()))?;

  let tokens = auth_service::generate_tokens(&app_state.config, user.id, &user.email)?;
  let (access_cookie, refresh_cookie) = cookies::auth_cookies(&app_state.config, &tokens);

  info!(user_id = %user.id, "Tokens refreshed.");

  Ok(
    HttpResponse::Ok()
      .cookie(access_cookie)
      .cookie(refresh_cookie)
      .json(json!({
          "user": PublicUser::from(user),
          "message": "Tokens refreshed successfully"
      })),
  )
}

#[instrument(name = "handler::logout", skip(app_state))]
pub async fn logout_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let (access_cookie, refresh_cookie) = cookies::clear_auth_cookies(&app_state.config);
  Ok(
    HttpResponse::Ok()
      .cookie(access_cookie)
      .cookie(refresh_cookie)
      .json(json!({"message": "Logout successful"})),
  )
}
