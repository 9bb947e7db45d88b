use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  /// HS256 signing secret for access and refresh tokens.
  pub jwt_secret: String,
  pub access_token_ttl_secs: i64,
  pub refresh_token_ttl_secs: i64,

  /// Whether auth cookies carry the Secure attribute (on behind TLS).
  pub cookie_secure: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let jwt_secret = get_env("JWT_SECRET")?;
    if jwt_secret.len() < 16 {
      return Err(AppError::Config(
        "JWT_SECRET must be at least 16 characters".to_string(),
      ));
    }

    let access_token_ttl_secs = get_env("ACCESS_TOKEN_TTL_SECS")
      .unwrap_or_else(|_| ACCESS_TOKEN_TTL_SECS.to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid ACCESS_TOKEN_TTL_SECS: {}", e)))?;
    let refresh_token_ttl_secs = get_env("REFRESH_TOKEN_TTL_SECS")
      .unwrap_or_else(|_| REFRESH_TOKEN_TTL_SECS.to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid REFRESH_TOKEN_TTL_SECS: {}", e)))?;

    let cookie_secure = get_env("COOKIE_SECURE")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid COOKIE_SECURE value: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      jwt_secret,
      access_token_ttl_secs,
      refresh_token_ttl_secs,
      cookie_secure,
    })
  }
}
