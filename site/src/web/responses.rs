// site/src/web/responses.rs

use actix_web::{http::StatusCode, HttpResponse};
use kihoko::{CartOutcome, CartRejection};
use serde::Serialize;
use serde_json::json;

pub fn rejection_status(reason: CartRejection) -> StatusCode {
  match reason {
    CartRejection::Unauthenticated => StatusCode::UNAUTHORIZED,
    CartRejection::VerificationRequired => StatusCode::FORBIDDEN,
    CartRejection::OutOfStock | CartRejection::ExceedsStock => StatusCode::CONFLICT,
  }
}

pub fn rejection_response(reason: CartRejection) -> HttpResponse {
  HttpResponse::build(rejection_status(reason)).json(json!({
    "success": false,
    "reason": reason,
    "message": reason.message(),
  }))
}

/// `200 {"success": true, "item": ...}` or the rejection.
pub fn outcome_response<T: Serialize>(outcome: CartOutcome<T>) -> HttpResponse {
  match outcome {
    CartOutcome::Applied(item) => HttpResponse::Ok().json(json!({"success": true, "item": item})),
    CartOutcome::Rejected(reason) => rejection_response(reason),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::body::to_bytes;

  #[test]
  fn rejections_map_to_statuses() {
    assert_eq!(rejection_status(CartRejection::Unauthenticated), StatusCode::UNAUTHORIZED);
    assert_eq!(rejection_status(CartRejection::VerificationRequired), StatusCode::FORBIDDEN);
    assert_eq!(rejection_status(CartRejection::OutOfStock), StatusCode::CONFLICT);
    assert_eq!(rejection_status(CartRejection::ExceedsStock), StatusCode::CONFLICT);
  }

  #[actix_web::test]
  async fn rejection_body_carries_reason_and_message() {
    let response = rejection_response(CartRejection::OutOfStock);
    let body = to_bytes(response.into_body()).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["reason"], "out_of_stock");
    assert_eq!(json["message"], "The item is out of stock");
  }

  #[actix_web::test]
  async fn applied_outcome_is_ok() {
    let response = outcome_response(CartOutcome::Applied(json!({"quantity": 2})));
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body()).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["item"]["quantity"], 2);
  }
}
