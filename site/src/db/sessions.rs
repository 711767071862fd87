// site/src/db/sessions.rs

//! Bearer-token sessions. A session row also carries the "cart last updated"
//! stamp consumed by the cart expiry check.

use crate::db::store_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kihoko::{CartActivity, ShopResult, Viewer};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// What the session middleware learns about the caller.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRecord {
  pub token: String,
  pub user_id: Uuid,
  pub email_confirmed: bool,
  pub cart_last_updated: Option<DateTime<Utc>>,
}

impl SessionRecord {
  pub fn viewer(&self) -> Viewer {
    Viewer::user(self.user_id, self.email_confirmed)
  }
}

pub async fn create_session(pool: &PgPool, token: &str, user_id: Uuid) -> Result<(), sqlx::Error> {
  sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
    .bind(token)
    .bind(user_id)
    .execute(pool)
    .await?;
  Ok(())
}

pub async fn find_session(pool: &PgPool, token: &str) -> Result<Option<SessionRecord>, sqlx::Error> {
  sqlx::query_as::<_, SessionRecord>(
    "SELECT s.token, s.user_id, u.email_confirmed, s.cart_last_updated \
     FROM sessions s JOIN users u ON u.id = s.user_id WHERE s.token = $1",
  )
  .bind(token)
  .fetch_optional(pool)
  .await
}

pub async fn delete_session(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
  let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
    .bind(token)
    .execute(pool)
    .await?;
  Ok(result.rows_affected() > 0)
}

/// [`CartActivity`] stored on the `sessions` row.
#[derive(Clone)]
pub struct SessionActivity {
  pool: PgPool,
  token: String,
}

impl SessionActivity {
  pub fn new(pool: PgPool, token: String) -> Self {
    Self { pool, token }
  }
}

#[async_trait]
impl CartActivity for SessionActivity {
  async fn last_updated(&self) -> ShopResult<Option<DateTime<Utc>>> {
    let stamp: Option<Option<DateTime<Utc>>> =
      sqlx::query_scalar("SELECT cart_last_updated FROM sessions WHERE token = $1")
        .bind(&self.token)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
    Ok(stamp.flatten())
  }

  async fn touch(&self, at: DateTime<Utc>) -> ShopResult<()> {
    sqlx::query("UPDATE sessions SET cart_last_updated = $2 WHERE token = $1")
      .bind(&self.token)
      .bind(at)
      .execute(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(())
  }

  async fn clear(&self) -> ShopResult<()> {
    sqlx::query("UPDATE sessions SET cart_last_updated = NULL WHERE token = $1")
      .bind(&self.token)
      .execute(&self.pool)
      .await
      .map_err(store_error)?;
    Ok(())
  }
}
