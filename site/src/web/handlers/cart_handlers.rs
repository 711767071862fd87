// site/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::CurrentViewer;
use crate::web::responses::{outcome_response, rejection_response};
use kihoko::CartRejection;

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
pub struct MerchRequestPayload {
  pub merch_id: i64,
}

#[derive(Deserialize, Debug)]
pub struct UpdateCartItemPayload {
  pub merch_id: i64,
  pub quantity: i32,
}

// --- Handler Implementations ---

#[instrument(name = "handler::view_cart", skip(app_state, current), fields(user_id = ?current.viewer().user_id))]
pub async fn view_cart_handler(
  app_state: web::Data<AppState>,
  current: CurrentViewer,
) -> Result<HttpResponse, AppError> {
  match app_state.carts.contents(current.viewer()).await? {
    Some(contents) => Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "cart": contents,
        "itemCount": contents.item_count(),
    }))),
    None => Ok(rejection_response(CartRejection::Unauthenticated)),
  }
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, current, req_payload),
    fields(user_id = ?current.viewer().user_id, merch_id = req_payload.merch_id)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  current: CurrentViewer,
  req_payload: web::Json<MerchRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let activity = current.cart_activity(&app_state);
  let outcome = app_state
    .carts
    .add_item(current.viewer(), activity.as_ref(), req_payload.merch_id)
    .await?;
  Ok(outcome_response(outcome))
}

#[instrument(
    name = "handler::update_cart_item",
    skip(app_state, current, req_payload),
    fields(user_id = ?current.viewer().user_id, merch_id = req_payload.merch_id, quantity = req_payload.quantity)
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  current: CurrentViewer,
  req_payload: web::Json<UpdateCartItemPayload>,
) -> Result<HttpResponse, AppError> {
  let activity = current.cart_activity(&app_state);
  let outcome = app_state
    .carts
    .update_quantity(
      current.viewer(),
      activity.as_ref(),
      req_payload.merch_id,
      req_payload.quantity,
    )
    .await?;
  Ok(outcome_response(outcome))
}

#[instrument(
    name = "handler::remove_cart_item",
    skip(app_state, current, req_payload),
    fields(user_id = ?current.viewer().user_id, merch_id = req_payload.merch_id)
)]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  current: CurrentViewer,
  req_payload: web::Json<MerchRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let activity = current.cart_activity(&app_state);
  let outcome = app_state
    .carts
    .remove_item(current.viewer(), activity.as_ref(), req_payload.merch_id)
    .await?;
  Ok(outcome_response(outcome))
}
