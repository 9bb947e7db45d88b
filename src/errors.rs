//! Application error type and its HTTP mapping.

use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// One field that failed input validation, reported back to the client.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
  pub field: &'static str,
  pub message: String,
}

impl FieldError {
  pub fn new(field: &'static str, message: impl Into<String>) -> Self {
    Self {
      field,
      message: message.into(),
    }
  }
}

#[derive(Debug, Error)]
pub enum AppError {
  /// Malformed input, with per-field detail. 400.
  #[error("Invalid input data")]
  InvalidInput(Vec<FieldError>),

  /// Business-rule violation (empty cart, unavailable product, self-purchase,
  /// duplicate email, ...). 400 with a descriptive message.
  #[error("Validation Error: {0}")]
  Validation(String),

  /// Missing or invalid credentials/token. 401.
  #[error("Authentication Failed: {0}")]
  Auth(String),

  /// Authenticated but not the owner of the resource. 403.
  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

// Lets handlers use `?` on functions returning anyhow::Result.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    if err.is::<sqlx::Error>() {
      return AppError::Sqlx(err.downcast::<sqlx::Error>().unwrap());
    }
    AppError::Internal(err.to_string())
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response.
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::InvalidInput(details) => {
        HttpResponse::BadRequest().json(json!({"error": "Invalid input data", "details": details}))
      }
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({"error": m})),
      AppError::Forbidden(m) => HttpResponse::Forbidden().json(json!({"error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      // 500s never leak internals to the client; the tracing line above keeps the detail.
      AppError::Config(_) => HttpResponse::InternalServerError().json(json!({"error": "Configuration issue"})),
      AppError::Sqlx(_) => HttpResponse::InternalServerError().json(json!({"error": "Database operation failed"})),
      AppError::Internal(_) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred"}))
      }
    }
  }
}

/// Result alias used throughout the application.
pub type Result<T, E = AppError> = std::result::Result<T, E>;
