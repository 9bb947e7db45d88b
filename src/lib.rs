//! Secondhand marketplace JSON API: listings, cart, transactional checkout,
//! and stateless token auth over actix-web and PostgreSQL.

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod validation;
pub mod web;

pub use errors::{AppError, Result};
pub use state::AppState;
