//! httpOnly cookies carrying the two auth tokens.

use crate::config::AppConfig;
use crate::services::auth_service::TokenPair;
use actix_web::cookie::{time::Duration, Cookie, SameSite};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

fn build(name: &'static str, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
  Cookie::build(name, value)
    .http_only(true)
    .secure(secure)
    .same_site(SameSite::Lax)
    .max_age(Duration::seconds(max_age_secs))
    .path("/")
    .finish()
}

/// Cookies for a freshly issued token pair, lifetimes matching the tokens.
pub fn auth_cookies(config: &AppConfig, tokens: &TokenPair) -> (Cookie<'static>, Cookie<'static>) {
  (
    build(
      ACCESS_TOKEN_COOKIE,
      tokens.access_token.clone(),
      config.access_token_ttl_secs,
      config.cookie_secure,
    ),
    build(
      REFRESH_TOKEN_COOKIE,
      tokens.refresh_token.clone(),
      config.refresh_token_ttl_secs,
      config.cookie_secure,
    ),
  )
}

/// Expired empty cookies that remove both tokens from the client.
pub fn clear_auth_cookies(config: &AppConfig) -> (Cookie<'static>, Cookie<'static>) {
  (
    build(ACCESS_TOKEN_COOKIE, String::new(), 0, config.cookie_secure),
    build(REFRESH_TOKEN_COOKIE, String::new(), 0, config.cookie_secure),
  )
}
