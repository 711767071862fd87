// site/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::MerchandiseImage;
use crate::services::MediaClient;
use crate::state::AppState;
use crate::web::extractors::{CurrentViewer, SignedInUser};
use crate::web::responses::rejection_response;
use kihoko::CartRejection;
use std::collections::HashMap;

/// Absolute URL of the first image of each merchandise.
fn first_image_urls(images: Vec<MerchandiseImage>, media: &MediaClient, origin: &str) -> HashMap<i64, String> {
  MerchandiseImage::by_merchandise(images)
    .into_iter()
    .filter_map(|(merchandise_id, images)| {
      let first = images.first()?;
      let url = media.absolute_url_for(&first.image_blob, origin)?;
      Some((merchandise_id, url))
    })
    .collect()
}

#[instrument(
    name = "handler::create_checkout_session",
    skip(app_state, auth_user, current),
    fields(user_id = %auth_user.user_id)
)]
pub async fn create_checkout_session_handler(
  app_state: web::Data<AppState>,
  auth_user: SignedInUser,
  current: CurrentViewer,
) -> Result<HttpResponse, AppError> {
  if !auth_user.email_verified {
    return Ok(rejection_response(CartRejection::VerificationRequired));
  }

  let contents = app_state
    .carts
    .contents(current.viewer())
    .await?
    .ok_or_else(|| AppError::Auth(CartRejection::Unauthenticated.message().to_string()))?;
  if contents.is_empty() {
    return Err(AppError::Validation("Your cart is empty.".to_string()));
  }

  let base = &app_state.config.app_base_url;
  let ids: Vec<i64> = contents.lines.iter().map(|line| line.merchandise.id).collect();
  let images = app_state.shop_store.list_merchandise_images(&ids).await?;
  let image_urls = first_image_urls(images, &app_state.media, base);

  let success_url = format!("{}/?success=true", base);
  let cancel_url = format!("{}/?canceled=true", base);
  let session = app_state
    .payments
    .create_checkout_session(&contents, &image_urls, &success_url, &cancel_url)
    .await?;

  info!(session_id = %session.id, total = %contents.total, "Checkout session started.");
  Ok(HttpResponse::Ok().json(json!({
      "sessionId": session.id,
      "url": session.url,
  })))
}
