use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::user::{PublicUser, User};
use crate::state::AppState;
use crate::validation::Validator;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::get_me", skip(auth), fields(user_id = %auth.user.id))]
pub async fn get_me_handler(auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(json!({ "user": PublicUser::from(auth.user) })))
}

#[derive(Deserialize, Debug)]
pub struct UpdateProfilePayload {
  pub username: Option<String>,
  pub avatar_url: Option<String>,
}

fn validate_profile_update(payload: &UpdateProfilePayload) -> Result<(), AppError> {
  let mut v = Validator::new();
  if let Some(username) = &payload.username {
    v.check(
      username.chars().count() >= 2,
      "username",
      "Username must be at least 2 characters",
    );
  }
  if let Some(url) = &payload.avatar_url {
    v.url("avatar_url", url);
  }
  v.finish()
}

#[instrument(name = "handler::update_me", skip(app_state, payload, auth), fields(user_id = %auth.user.id))]
pub async fn update_me_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<UpdateProfilePayload>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  validate_profile_update(&payload)?;

  let user: User = sqlx::query_as(
    "UPDATE users SET \
       username = COALESCE($1, username), \
       avatar_url = COALESCE($2, avatar_url), \
       updated_at = now() \
     WHERE id = $3 \
     RETURNING *",
  )
  .bind(&payload.username)
  .bind(&payload.avatar_url)
  .bind(auth.user.id)
  .fetch_one(&app_state.db_pool)
  .await?;

  info!("Profile updated.");

  Ok(HttpResponse::Ok().json(json!({
      "user": PublicUser::from(user),
      "message": "Profile updated successfully"
  })))
}
