// kihoko/src/model/viewer.rs

use serde::Serialize;
use uuid::Uuid;

/// Who is making the request, as far as the cart core cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewer {
  pub user_id: Option<Uuid>,
  pub email_verified: bool,
}

impl Viewer {
  pub fn anonymous() -> Self {
    Self {
      user_id: None,
      email_verified: false,
    }
  }

  pub fn user(user_id: Uuid, email_verified: bool) -> Self {
    Self {
      user_id: Some(user_id),
      email_verified,
    }
  }

  pub fn is_authenticated(&self) -> bool {
    self.user_id.is_some()
  }
}

impl Default for Viewer {
  fn default() -> Self {
    Self::anonymous()
  }
}
