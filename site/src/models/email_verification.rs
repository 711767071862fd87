// site/src/models/email_verification.rs

use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const ACTIVATION_TTL_HOURS: i64 = 72;

/// One-shot activation token sent by email.
#[derive(Debug, Clone, FromRow)]
pub struct EmailVerification {
  pub token: String,
  pub user_id: Uuid,
  /// Address the link was sent to.
  pub email: String,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl EmailVerification {
  pub fn expiry_from(issued_at: DateTime<Utc>) -> DateTime<Utc> {
    issued_at + Duration::hours(ACTIVATION_TTL_HOURS)
  }

  /// A token confirms only the address it was issued for, and only until it
  /// expires.
  pub fn confirms(&self, current_email: &str, now: DateTime<Utc>) -> bool {
    now < self.expires_at && self.email.eq_ignore_ascii_case(current_email)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn issued(hours_ago: i64) -> EmailVerification {
    let created_at = Utc::now() - Duration::hours(hours_ago);
    EmailVerification {
      token: "t".to_string(),
      user_id: Uuid::new_v4(),
      email: "ink@kihoko.com".to_string(),
      created_at,
      expires_at: EmailVerification::expiry_from(created_at),
    }
  }

  #[test]
  fn fresh_token_confirms_its_address() {
    let v = issued(1);
    assert!(v.confirms("ink@kihoko.com", Utc::now()));
    assert!(v.confirms("INK@kihoko.com", Utc::now()));
  }

  #[test]
  fn token_is_useless_after_email_change_or_expiry() {
    assert!(!issued(1).confirms("new@kihoko.com", Utc::now()));
    assert!(!issued(73).confirms("ink@kihoko.com", Utc::now()));
  }
}
