// site/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use kihoko::ShopError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Payment Processing Error: {0}")]
  Payment(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Stripe API Error: {0}")]
  Stripe(String),

  #[error("Email Delivery Error: {0}")]
  Email(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl From<ShopError> for AppError {
  fn from(err: ShopError) -> Self {
    match err {
      ShopError::NotFound { .. } => AppError::NotFound(err.to_string()),
      ShopError::Store { source } => AppError::from(source),
      ShopError::Internal(m) => AppError::Internal(m),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Payment(_) | AppError::Stripe(_) => StatusCode::BAD_GATEWAY,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Email(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    let status = self.status_code();
    match self {
      AppError::Validation(m)
      | AppError::Auth(m)
      | AppError::Forbidden(m)
      | AppError::NotFound(m)
      | AppError::Conflict(m) => HttpResponse::build(status).json(json!({"success": false, "error": m})),
      AppError::Payment(m) | AppError::Stripe(m) => HttpResponse::build(status).json(json!({
        "success": false,
        "error": "There was an error creating the checkout session. Please try again later.",
        "detail": m,
      })),
      AppError::Sqlx(_) => {
        HttpResponse::build(status).json(json!({"success": false, "error": "Database operation failed"}))
      }
      AppError::Email(_) => {
        HttpResponse::build(status).json(json!({"success": false, "error": "Email service error"}))
      }
      AppError::Config(_) | AppError::Internal(_) => HttpResponse::build(status)
        .json(json!({"success": false, "error": "An unexpected error occurred. Please try again later."})),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_codes_follow_error_kind() {
    assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::Auth("x".into()).status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
    assert_eq!(AppError::Stripe("x".into()).status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(AppError::Email("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn shop_errors_convert() {
    let not_found: AppError = ShopError::merchandise_not_found(7).into();
    assert!(matches!(not_found, AppError::NotFound(ref m) if m == "Merchandise not found: 7"));

    let store: AppError = ShopError::from(anyhow::anyhow!("connection reset")).into();
    assert!(matches!(store, AppError::Internal(ref m) if m == "connection reset"));

    let db: AppError = ShopError::from(anyhow::Error::new(sqlx::Error::RowNotFound)).into();
    assert!(matches!(db, AppError::Sqlx(_)));
  }
}
