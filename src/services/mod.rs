//! Domain services sitting between the HTTP handlers and the database.

pub mod auth_service;
pub mod checkout_service;
pub mod listing_service;
