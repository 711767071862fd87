// site/src/services/payments.rs

//! Stripe Checkout Sessions over Stripe's form-encoded HTTPS API.

use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};
use kihoko::CartContents;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
  pub id: String,
  #[serde(default)]
  pub url: Option<String>,
}

/// Price in the currency's minor unit, rounded to the nearest cent.
pub fn to_minor_units(price: Decimal) -> AppResult<i64> {
  (price * Decimal::ONE_HUNDRED)
    .round()
    .to_i64()
    .filter(|cents| *cents >= 0)
    .ok_or_else(|| AppError::Payment(format!("Price {} cannot be charged", price)))
}

/// Form fields of a `POST /v1/checkout/sessions` request. `image_urls` maps
/// merchandise ids to the picture Stripe shows for that line.
pub fn checkout_form(
  contents: &CartContents,
  image_urls: &HashMap<i64, String>,
  currency: &str,
  success_url: &str,
  cancel_url: &str,
) -> AppResult<Vec<(String, String)>> {
  let mut form = vec![
    ("mode".to_string(), "payment".to_string()),
    ("payment_method_types[0]".to_string(), "card".to_string()),
    ("success_url".to_string(), success_url.to_string()),
    ("cancel_url".to_string(), cancel_url.to_string()),
    ("client_reference_id".to_string(), contents.cart.id.to_string()),
  ];
  for (i, line) in contents.lines.iter().enumerate() {
    let prefix = format!("line_items[{}]", i);
    form.push((format!("{}[price_data][currency]", prefix), currency.to_string()));
    form.push((
      format!("{}[price_data][unit_amount]", prefix),
      to_minor_units(line.merchandise.price)?.to_string(),
    ));
    form.push((
      format!("{}[price_data][product_data][name]", prefix),
      line.merchandise.title.clone(),
    ));
    if let Some(url) = image_urls.get(&line.merchandise.id) {
      form.push((format!("{}[price_data][product_data][images][0]", prefix), url.clone()));
    }
    form.push((format!("{}[quantity]", prefix), line.item.quantity.to_string()));
  }
  Ok(form)
}

#[derive(Clone)]
pub struct StripeClient {
  client: reqwest::Client,
  api_base: String,
  secret_key: Option<String>,
  currency: String,
}

impl StripeClient {
  pub fn new(client: reqwest::Client, config: &AppConfig) -> Self {
    if config.stripe_secret_key.is_none() {
      warn!("STRIPE_SECRET_KEY not set; checkout is disabled.");
    }
    Self {
      client,
      api_base: config.stripe_api_base.clone(),
      secret_key: config.stripe_secret_key.clone(),
      currency: config.stripe_currency.clone(),
    }
  }

  #[instrument(
    name = "payments::create_checkout_session",
    skip(self, contents, image_urls, success_url, cancel_url),
    fields(cart_id = contents.cart.id, lines = contents.lines.len()),
    err(Display)
  )]
  pub async fn create_checkout_session(
    &self,
    contents: &CartContents,
    image_urls: &HashMap<i64, String>,
    success_url: &str,
    cancel_url: &str,
  ) -> AppResult<CheckoutSession> {
    let secret_key = self
      .secret_key
      .as_deref()
      .ok_or_else(|| AppError::Config("Stripe is not configured".to_string()))?;
    let form = checkout_form(contents, image_urls, &self.currency, success_url, cancel_url)?;

    let response = self
      .client
      .post(format!("{}/v1/checkout/sessions", self.api_base))
      .basic_auth(secret_key, Some(""))
      .form(&form)
      .send()
      .await
      .map_err(|e| AppError::Stripe(format!("Stripe API request failed: {}", e)))?;

    if !response.status().is_success() {
      let error_text = response.text().await.unwrap_or_default();
      warn!("Stripe API error: {}", error_text);
      return Err(AppError::Stripe(error_text));
    }

    let session: CheckoutSession = response
      .json()
      .await
      .map_err(|e| AppError::Stripe(format!("Failed to parse Stripe response: {}", e)))?;
    info!(session_id = %session.id, "Stripe checkout session created.");
    Ok(session)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;
  use kihoko::{Cart, CartItem, CartLine, Merchandise};

  fn contents() -> CartContents {
    let cart = Cart {
      id: 42,
      user_id: None,
      created_at: Utc::now(),
    };
    let line = |id: i64, title: &str, price: Decimal, quantity: i32| CartLine {
      item: CartItem {
        id,
        cart_id: 42,
        merchandise_id: id,
        quantity,
        created_at: Utc::now(),
      },
      merchandise: Merchandise {
        id,
        title: title.to_string(),
        description: String::new(),
        price,
        stock: 10,
      },
    };
    CartContents::new(
      cart,
      vec![
        line(1, "Koi print", Decimal::new(2500, 2), 2),
        line(2, "Sticker", Decimal::new(399, 2), 1),
      ],
    )
  }

  #[test]
  fn prices_become_cents() {
    assert_eq!(to_minor_units(Decimal::new(2500, 2)).unwrap(), 2500);
    assert_eq!(to_minor_units(Decimal::new(1999, 2)).unwrap(), 1999);
    assert_eq!(to_minor_units(Decimal::new(5, 0)).unwrap(), 500);
    assert!(to_minor_units(Decimal::new(-1, 0)).is_err());
  }

  #[test]
  fn form_lists_every_line() {
    let images = HashMap::from([(1, "https://cdn.k.com/koi.jpg".to_string())]);
    let form = checkout_form(
      &contents(),
      &images,
      "usd",
      "https://k.com/?success=true",
      "https://k.com/?canceled=true",
    )
    .unwrap();
    let get = |key: &str| form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

    assert_eq!(get("mode"), Some("payment"));
    assert_eq!(get("success_url"), Some("https://k.com/?success=true"));
    assert_eq!(get("client_reference_id"), Some("42"));
    assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("2500"));
    assert_eq!(get("line_items[0][quantity]"), Some("2"));
    assert_eq!(get("line_items[1][price_data][product_data][name]"), Some("Sticker"));
    assert_eq!(get("line_items[1][price_data][currency]"), Some("usd"));
    assert_eq!(get("line_items[2][quantity]"), None);
    assert_eq!(
      get("line_items[0][price_data][product_data][images][0]"),
      Some("https://cdn.k.com/koi.jpg")
    );
    assert_eq!(get("line_items[1][price_data][product_data][images][0]"), None);
  }
}
