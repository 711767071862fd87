// site/src/web/extractors.rs

use crate::db::SessionActivity;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::middleware::RequestSession;
use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use kihoko::{CartActivity, CartRejection, MemoryActivity, Viewer};
use tracing::warn;
use uuid::Uuid;

/// The caller as resolved by the session middleware; anonymous if there is no
/// valid session.
#[derive(Debug, Clone)]
pub struct CurrentViewer(pub RequestSession);

impl CurrentViewer {
  pub fn viewer(&self) -> &Viewer {
    &self.0.viewer
  }

  /// Session-backed "cart last updated" stamp. Anonymous callers get a
  /// throwaway one; cart operations refuse them before touching it.
  pub fn cart_activity(&self, state: &AppState) -> Box<dyn CartActivity> {
    match &self.0.token {
      Some(token) => Box::new(SessionActivity::new(state.db_pool.clone(), token.clone())),
      None => Box::new(MemoryActivity::new()),
    }
  }
}

impl FromRequest for CurrentViewer {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let session = req.extensions().get::<RequestSession>().cloned().unwrap_or_default();
    ready(Ok(CurrentViewer(session)))
  }
}

/// Requires a live session.
#[derive(Debug, Clone)]
pub struct SignedInUser {
  pub user_id: Uuid,
  pub email_verified: bool,
  pub token: String,
}

impl FromRequest for SignedInUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let session = req.extensions().get::<RequestSession>().cloned().unwrap_or_default();
    match (session.viewer.user_id, session.token) {
      (Some(user_id), Some(token)) => ready(Ok(SignedInUser {
        user_id,
        email_verified: session.viewer.email_verified,
        token,
      })),
      _ => {
        warn!(path = %req.path(), "SignedInUser extractor: no valid session.");
        ready(Err(AppError::Auth(CartRejection::Unauthenticated.message().to_string())))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;

  #[actix_web::test]
  async fn anonymous_without_session_extension() {
    let (req, mut payload) = TestRequest::default().to_http_parts();
    let current = CurrentViewer::from_request(&req, &mut payload).await.unwrap();
    assert!(!current.viewer().is_authenticated());

    let signed_in = SignedInUser::from_request(&req, &mut payload).await;
    assert!(matches!(signed_in, Err(AppError::Auth(_))));
  }

  #[actix_web::test]
  async fn reads_session_from_extensions() {
    let user_id = Uuid::new_v4();
    let (req, mut payload) = TestRequest::default().to_http_parts();
    req.extensions_mut().insert(RequestSession {
      token: Some("tok".to_string()),
      viewer: Viewer::user(user_id, true),
    });

    let signed_in = SignedInUser::from_request(&req, &mut payload).await.unwrap();
    assert_eq!(signed_in.user_id, user_id);
    assert!(signed_in.email_verified);
    assert_eq!(signed_in.token, "tok");
  }
}
