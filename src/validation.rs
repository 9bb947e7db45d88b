//! Field-level input validation.
//!
//! Handlers collect per-field failures into a [`Validator`] and convert the
//! batch into a single 400 response, so a client sees everything wrong with
//! a payload at once rather than one field per round trip.

use crate::errors::{AppError, FieldError, Result};

#[derive(Debug, Default)]
pub struct Validator {
  errors: Vec<FieldError>,
}

impl Validator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records `message` against `field` when `ok` is false.
  pub fn check(&mut self, ok: bool, field: &'static str, message: &str) -> &mut Self {
    if !ok {
      self.errors.push(FieldError::new(field, message));
    }
    self
  }

  pub fn email(&mut self, field: &'static str, value: &str) -> &mut Self {
    self.check(looks_like_email(value), field, "Invalid email address")
  }

  pub fn url(&mut self, field: &'static str, value: &str) -> &mut Self {
    let ok = value.starts_with("http://") || value.starts_with("https://");
    self.check(ok, field, "Invalid URL")
  }

  pub fn finish(self) -> Result<()> {
    if self.errors.is_empty() {
      Ok(())
    } else {
      Err(AppError::InvalidInput(self.errors))
    }
  }
}

/// Cheap structural check: one '@', a non-empty local part, and a dot in the
/// domain. Deliverability is not our problem.
fn looks_like_email(s: &str) -> bool {
  if s.contains(char::is_whitespace) {
    return false;
  }
  match s.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    }
    None => false,
  }
}
