// site/src/services/mailer.rs

//! Transactional email over an HTTPS JSON API (Brevo's `smtp/email` shape).
//!
//! Without an API key the mailer runs in log-only mode: messages are written
//! to the log and reported as sent.

use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};
use serde::Serialize;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
  Sent { message_id: Option<String> },
  Logged,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
  email: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailPayload<'a> {
  sender: Address<'a>,
  to: Vec<Address<'a>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  reply_to: Option<Address<'a>>,
  subject: &'a str,
  text_content: &'a str,
}

/// One outgoing message.
#[derive(Debug, Clone)]
pub struct Email<'a> {
  pub to: &'a str,
  pub reply_to: Option<&'a str>,
  pub subject: &'a str,
  pub body: &'a str,
}

#[derive(Clone)]
pub struct Mailer {
  client: reqwest::Client,
  api_url: String,
  api_key: Option<String>,
  sender: String,
}

impl Mailer {
  pub fn new(client: reqwest::Client, config: &AppConfig) -> Self {
    if config.email_api_key.is_none() {
      warn!("EMAIL_API_KEY not set; outgoing email will only be logged.");
    }
    Self {
      client,
      api_url: config.email_api_url.clone(),
      api_key: config.email_api_key.clone(),
      sender: config.email_sender.clone(),
    }
  }

  pub fn sender(&self) -> &str {
    &self.sender
  }

  fn payload<'a>(&'a self, email: &Email<'a>) -> EmailPayload<'a> {
    EmailPayload {
      sender: Address {
        email: &self.sender,
        name: Some("Kihoko"),
      },
      to: vec![Address {
        email: email.to,
        name: None,
      }],
      reply_to: email.reply_to.map(|addr| Address { email: addr, name: None }),
      subject: email.subject,
      text_content: email.body,
    }
  }

  #[instrument(name = "mailer::send", skip(self, email), fields(to = %email.to, subject = %email.subject), err(Display))]
  pub async fn send(&self, email: Email<'_>) -> AppResult<Delivery> {
    let Some(api_key) = &self.api_key else {
      info!(body = %email.body, "Email (log-only mode).");
      return Ok(Delivery::Logged);
    };

    let response = self
      .client
      .post(&self.api_url)
      .header("api-key", api_key)
      .json(&self.payload(&email))
      .send()
      .await
      .map_err(|e| AppError::Email(format!("Email API request failed: {}", e)))?;

    if !response.status().is_success() {
      let status = response.status();
      let error_text = response.text().await.unwrap_or_default();
      warn!(%status, "Email API refused the message: {}", error_text);
      return Err(AppError::Email(format!("Email API answered {}: {}", status, error_text)));
    }

    let body: serde_json::Value = response.json().await.unwrap_or_default();
    let message_id = body.get("messageId").and_then(|v| v.as_str()).map(str::to_string);
    info!(message_id = ?message_id, "Email sent.");
    Ok(Delivery::Sent { message_id })
  }
}

pub fn activation_email_body(first_name: &str, activation_link: &str) -> String {
  let greeting = if first_name.trim().is_empty() {
    "Hi,".to_string()
  } else {
    format!("Hi {},", first_name.trim())
  };
  format!(
    "{}\n\nPlease confirm your email address by opening the link below:\n\n{}\n\n\
     The link is valid for 72 hours. If you did not request this, you can ignore this email.\n\n\
     Kihoko",
    greeting, activation_link
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn mailer(api_key: Option<&str>) -> Mailer {
    Mailer {
      client: reqwest::Client::new(),
      api_url: "http://127.0.0.1:9/unused".to_string(),
      api_key: api_key.map(str::to_string),
      sender: "kiho@kihoko.com".to_string(),
    }
  }

  #[test]
  fn payload_uses_camel_case_fields() {
    let m = mailer(None);
    let email = Email {
      to: "fan@example.com",
      reply_to: Some("fan@example.com"),
      subject: "general",
      body: "hello",
    };
    let json = serde_json::to_value(m.payload(&email)).unwrap();
    assert_eq!(json["sender"]["email"], "kiho@kihoko.com");
    assert_eq!(json["to"][0]["email"], "fan@example.com");
    assert_eq!(json["replyTo"]["email"], "fan@example.com");
    assert_eq!(json["textContent"], "hello");
  }

  #[tokio::test]
  async fn without_key_messages_are_only_logged() {
    let delivery = mailer(None)
      .send(Email {
        to: "fan@example.com",
        reply_to: None,
        subject: "s",
        body: "b",
      })
      .await
      .unwrap();
    assert_eq!(delivery, Delivery::Logged);
  }

  #[test]
  fn activation_body_contains_link() {
    let body = activation_email_body("Kiho", "https://kihoko.com/api/auth/activate/abc");
    assert!(body.starts_with("Hi Kiho,"));
    assert!(body.contains("https://kihoko.com/api/auth/activate/abc"));
    assert!(activation_email_body(" ", "x").starts_with("Hi,"));
  }
}
