// site/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  /// Public origin used for activation links and Stripe redirect URLs.
  pub app_base_url: String,

  pub cart_expiry_hours: i64,

  pub stripe_secret_key: Option<String>,
  pub stripe_public_key: Option<String>,
  pub stripe_api_base: String,
  pub stripe_currency: String,

  pub email_api_url: String,
  /// Without a key the mailer only logs outgoing messages.
  pub email_api_key: Option<String>,
  pub email_sender: String,
  pub contact_recipient: String,

  pub media_base_url: Option<String>,
  pub media_container: String,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|var_name| env::var(var_name).ok())
  }

  /// Builds the config from any name -> value source.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get_env = |var_name: &str| {
      lookup(var_name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let database_max_connections = get_env("DATABASE_MAX_CONNECTIONS")
      .unwrap_or_else(|_| "10".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;
    let app_base_url = get_env("APP_BASE_URL")
      .unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port))
      .trim_end_matches('/')
      .to_string();

    let cart_expiry_hours = get_env("CART_EXPIRY_HOURS")
      .unwrap_or_else(|_| kihoko::DEFAULT_CART_EXPIRY_HOURS.to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid CART_EXPIRY_HOURS: {}", e)))?;
    if cart_expiry_hours < 1 {
      return Err(AppError::Config("CART_EXPIRY_HOURS must be at least 1".to_string()));
    }

    let stripe_secret_key = get_env("STRIPE_SECRET_KEY").ok();
    let stripe_public_key = get_env("STRIPE_PUBLIC_KEY").ok();
    let stripe_api_base = get_env("STRIPE_API_BASE")
      .unwrap_or_else(|_| "https://api.stripe.com".to_string())
      .trim_end_matches('/')
      .to_string();
    let stripe_currency = get_env("STRIPE_CURRENCY")
      .unwrap_or_else(|_| "usd".to_string())
      .to_lowercase();

    let email_api_url =
      get_env("EMAIL_API_URL").unwrap_or_else(|_| "https://api.brevo.com/v3/smtp/email".to_string());
    let email_api_key = get_env("EMAIL_API_KEY").ok();
    let email_sender = get_env("EMAIL_SENDER").unwrap_or_else(|_| "kiho@kihoko.com".to_string());
    let contact_recipient = get_env("CONTACT_RECIPIENT").unwrap_or_else(|_| email_sender.clone());

    let media_base_url = get_env("MEDIA_BASE_URL")
      .ok()
      .map(|url| url.trim_end_matches('/').to_string());
    let media_container = get_env("MEDIA_CONTAINER").unwrap_or_else(|_| "portfolio-images".to_string());

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      app_base_url,
      cart_expiry_hours,
      stripe_secret_key,
      stripe_public_key,
      stripe_api_base,
      stripe_currency,
      email_api_url,
      email_api_key,
      email_sender,
      contact_recipient,
      media_base_url,
      media_container,
    })
  }
}
