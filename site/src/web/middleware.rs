// site/src/web/middleware.rs

//! Per-request session resolution and the passive cart expiry check.
//!
//! The caller is identified by an `Authorization: Bearer <token>` header. The
//! resolved [`RequestSession`] is stored in the request extensions for the
//! extractors in [`crate::web::extractors`].

use crate::db::{sessions, SessionActivity};
use crate::errors::AppError;
use crate::state::AppState;
use actix_web::{
  body::MessageBody,
  dev::{ServiceRequest, ServiceResponse},
  http::header::{HeaderMap, AUTHORIZATION},
  middleware::Next,
  web, HttpMessage,
};
use chrono::Utc;
use kihoko::{SweepReport, Viewer};
use tracing::{debug, error, info};

/// Identity of the current request.
#[derive(Debug, Clone, Default)]
pub struct RequestSession {
  /// Bearer token of a live session.
  pub token: Option<String>,
  pub viewer: Viewer,
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
  let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.trim().split_once(' ')?;
  let token = token.trim();
  if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
    Some(token.to_string())
  } else {
    None
  }
}

pub async fn session_layer(
  req: ServiceRequest,
  next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
  let state = req.app_data::<web::Data<AppState>>().cloned();
  let token = bearer_token(req.headers());

  let session = match (state, token) {
    (Some(state), Some(token)) => resolve_session(&state, token).await?,
    _ => RequestSession::default(),
  };
  req.extensions_mut().insert(session);

  next.call(req).await
}

async fn resolve_session(state: &AppState, token: String) -> Result<RequestSession, AppError> {
  let Some(record) = sessions::find_session(&state.db_pool, &token).await? else {
    debug!("Unknown session token; treating the caller as anonymous.");
    return Ok(RequestSession::default());
  };
  let viewer = record.viewer();

  if record.cart_last_updated.is_some() {
    let activity = SessionActivity::new(state.db_pool.clone(), record.token.clone());
    // The sweep is one transaction; on failure nothing changed and the next
    // request tries again.
    match state.sweeper.sweep_if_expired(&viewer, &activity, Utc::now()).await {
      Ok(SweepReport::Swept { units_released, .. }) => {
        info!(user_id = %record.user_id, units_released, "Idle cart released before handling request.");
      }
      Ok(_) => {}
      Err(e) => error!(user_id = %record.user_id, error = %e, "Cart expiry sweep failed."),
    }
  }

  Ok(RequestSession {
    token: Some(record.token),
    viewer,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::http::header::HeaderValue;

  fn headers_with(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
  }

  #[test]
  fn reads_bearer_tokens() {
    assert_eq!(bearer_token(&headers_with("Bearer abc123")).as_deref(), Some("abc123"));
    assert_eq!(bearer_token(&headers_with("bearer  abc123 ")).as_deref(), Some("abc123"));
  }

  #[test]
  fn ignores_other_schemes_and_blank_tokens() {
    assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwdw==")), None);
    assert_eq!(bearer_token(&headers_with("Bearer ")), None);
    assert_eq!(bearer_token(&HeaderMap::new()), None);
  }
}
