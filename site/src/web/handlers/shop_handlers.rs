// site/src/web/handlers/shop_handlers.rs

use actix_web::{web, HttpResponse};
use kihoko::Merchandise;
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::models::MerchandiseImage;
use crate::services::MediaClient;
use crate::state::AppState;
use crate::web::extractors::CurrentViewer;

// --- Response DTOs ---
#[derive(Serialize, Debug)]
pub struct MerchandiseImageView {
  pub id: i64,
  pub title: String,
  pub image_url: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct MerchandiseView {
  #[serde(flatten)]
  pub merchandise: Merchandise,
  pub images: Vec<MerchandiseImageView>,
}

/// Pairs each merchandise with the URLs of its images.
pub fn merchandise_views(
  merchandise: Vec<Merchandise>,
  images: Vec<MerchandiseImage>,
  media: &MediaClient,
) -> Vec<MerchandiseView> {
  let mut grouped = MerchandiseImage::by_merchandise(images);
  merchandise
    .into_iter()
    .map(|merch| {
      let images = grouped
        .remove(&merch.id)
        .unwrap_or_default()
        .into_iter()
        .map(|image| MerchandiseImageView {
          image_url: media.url_for(&image.image_blob),
          id: image.id,
          title: image.title,
        })
        .collect();
      MerchandiseView {
        merchandise: merch,
        images,
      }
    })
    .collect()
}

/// Storefront: merchandise, the caller's cart, and what the page needs to
/// start checkout.
#[instrument(name = "handler::shop", skip(app_state, current), fields(user_id = ?current.viewer().user_id))]
pub async fn shop_handler(
  app_state: web::Data<AppState>,
  current: CurrentViewer,
) -> Result<HttpResponse, AppError> {
  let merchandise = app_state.shop_store.list_merchandise().await?;
  let ids: Vec<i64> = merchandise.iter().map(|m| m.id).collect();
  let images = app_state.shop_store.list_merchandise_images(&ids).await?;
  let cart = app_state.carts.contents(current.viewer()).await?;
  let viewer = current.viewer();

  Ok(HttpResponse::Ok().json(json!({
      "merchandise": merchandise_views(merchandise, images, &app_state.media),
      "cart": cart,
      "stripePublicKey": app_state.config.stripe_public_key,
      "showEmailVerificationMessage": viewer.is_authenticated() && !viewer.email_verified,
  })))
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal::Decimal;

  fn merch(id: i64, title: &str) -> Merchandise {
    Merchandise {
      id,
      title: title.to_string(),
      description: String::new(),
      price: Decimal::new(3000, 2),
      stock: 4,
    }
  }

  #[test]
  fn views_carry_image_urls() {
    let media = MediaClient::new(Some("https://cdn.kihoko.com".to_string()), "merch".to_string());
    let images = vec![
      MerchandiseImage {
        id: 7,
        merchandise_id: 1,
        image_blob: "tote-front.jpg".to_string(),
        title: "Front".to_string(),
      },
      MerchandiseImage {
        id: 8,
        merchandise_id: 1,
        image_blob: "tote-back.jpg".to_string(),
        title: "Back".to_string(),
      },
    ];

    let views = merchandise_views(vec![merch(1, "Tote"), merch(2, "Pin")], images, &media);

    assert_eq!(views.len(), 2);
    assert_eq!(views[0].images.len(), 2);
    assert_eq!(
      views[0].images[0].image_url.as_deref(),
      Some("https://cdn.kihoko.com/merch/tote-front.jpg")
    );
    assert!(views[1].images.is_empty());

    let json = serde_json::to_value(&views[0]).unwrap();
    assert_eq!(json["title"], "Tote");
    assert_eq!(json["stock"], 4);
    assert_eq!(json["images"][1]["title"], "Back");
  }
}
