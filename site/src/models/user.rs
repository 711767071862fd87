// site/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
  pub id: Uuid,
  /// Also the username.
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub first_name: String,
  pub last_name: String,
  pub email_confirmed: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
