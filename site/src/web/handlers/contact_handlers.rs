// site/src/web/handlers/contact_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::auth_service::is_plausible_email;
use crate::services::mailer::Email;
use crate::state::AppState;

pub const MAX_NAME_LEN: usize = 100;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContactSubject {
  RequestQuote,
  InquiryServices,
  Feedback,
  Collaboration,
  General,
}

impl ContactSubject {
  pub fn label(&self) -> &'static str {
    match self {
      ContactSubject::RequestQuote => "Request a quote",
      ContactSubject::InquiryServices => "Inquiry about your services",
      ContactSubject::Feedback => "Feedback on your portfolio",
      ContactSubject::Collaboration => "Collaboration proposal",
      ContactSubject::General => "General question or comment",
    }
  }
}

#[derive(Deserialize, Debug)]
pub struct ContactRequestPayload {
  pub name: String,
  pub email: String,
  pub subject: ContactSubject,
  pub message: String,
}

impl ContactRequestPayload {
  pub fn validate(&self) -> Result<(), AppError> {
    let name_len = self.name.trim().chars().count();
    if name_len == 0 || name_len > MAX_NAME_LEN {
      return Err(AppError::Validation(format!(
        "Name must be between 1 and {} characters.",
        MAX_NAME_LEN
      )));
    }
    if !is_plausible_email(&self.email) {
      return Err(AppError::Validation("Enter a valid email address.".to_string()));
    }
    if self.message.trim().is_empty() {
      return Err(AppError::Validation("Message cannot be empty.".to_string()));
    }
    Ok(())
  }

  pub fn body(&self) -> String {
    format!("From: {} <{}>\n\n{}", self.name.trim(), self.email.trim(), self.message)
  }
}

#[instrument(name = "handler::contact", skip(app_state, req_payload), fields(subject = ?req_payload.subject))]
pub async fn contact_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<ContactRequestPayload>,
) -> Result<HttpResponse, AppError> {
  req_payload.validate()?;

  let body = req_payload.body();
  app_state
    .mailer
    .send(Email {
      to: &app_state.config.contact_recipient,
      reply_to: Some(req_payload.email.trim()),
      subject: req_payload.subject.label(),
      body: &body,
    })
    .await?;

  info!("Contact message forwarded.");
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "message": "Your message has been sent successfully!",
  })))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn payload(name: &str, email: &str, message: &str) -> ContactRequestPayload {
    ContactRequestPayload {
      name: name.to_string(),
      email: email.to_string(),
      subject: ContactSubject::General,
      message: message.to_string(),
    }
  }

  #[test]
  fn subjects_parse_from_snake_case() {
    let parsed: ContactRequestPayload = serde_json::from_value(json!({
      "name": "Ana", "email": "ana@example.com", "subject": "request_quote", "message": "Hi"
    }))
    .unwrap();
    assert_eq!(parsed.subject, ContactSubject::RequestQuote);

    let bad = serde_json::from_value::<ContactRequestPayload>(json!({
      "name": "Ana", "email": "ana@example.com", "subject": "spam", "message": "Hi"
    }));
    assert!(bad.is_err());
  }

  #[test]
  fn validation_rules() {
    assert!(payload("Ana", "ana@example.com", "Hello").validate().is_ok());
    assert!(payload("", "ana@example.com", "Hello").validate().is_err());
    assert!(payload(&"x".repeat(101), "ana@example.com", "Hello").validate().is_err());
    assert!(payload(&"x".repeat(100), "ana@example.com", "Hello").validate().is_ok());
    assert!(payload("Ana", "not-an-email", "Hello").validate().is_err());
    assert!(payload("Ana", "ana@example.com", "   ").validate().is_err());
  }

  #[test]
  fn body_names_the_sender() {
    let p = payload("Ana", "ana@example.com", "Do you do fine line?");
    assert_eq!(p.body(), "From: Ana <ana@example.com>\n\nDo you do fine line?");
  }
}
