use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::validation::Validator;

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ContactCategory {
  General,
  Account,
  Payment,
  Technical,
  Seller,
  Buyer,
  Report,
}

#[derive(Deserialize, Debug)]
pub struct ContactPayload {
  pub name: String,
  pub email: String,
  pub subject: String,
  pub message: String,
  pub category: ContactCategory,
}

fn validate_contact(payload: &ContactPayload) -> Result<(), AppError> {
  let mut v = Validator::new();
  v.check(!payload.name.is_empty(), "name", "Name is required");
  v.check(
    payload.name.chars().count() <= 100,
    "name",
    "Name must be less than 100 characters",
  );
  v.email("email", &payload.email);
  v.check(!payload.subject.is_empty(), "subject", "Subject is required");
  v.check(
    payload.subject.chars().count() <= 200,
    "subject",
    "Subject must be less than 200 characters",
  );
  v.check(
    payload.message.chars().count() >= 10,
    "message",
    "Message must be at least 10 characters",
  );
  v.check(
    payload.message.chars().count() <= 2000,
    "message",
    "Message must be less than 2000 characters",
  );
  v.finish()
}

/// Support-form intake. Submissions are logged, not persisted; ticketing is
/// handled outside this service.
#[instrument(name = "handler::contact", skip(payload), fields(category = ?payload.category))]
pub async fn contact_handler(payload: web::Json<ContactPayload>) -> Result<HttpResponse, AppError> {
  validate_contact(&payload)?;

  info!(
    name = %payload.name,
    email = %payload.email,
    subject = %payload.subject,
    "Contact form submission received."
  );

  Ok(HttpResponse::Ok().json(json!({
      "message": "Thank you for your message! We will get back to you within 24 hours.",
      "success": true
  })))
}
