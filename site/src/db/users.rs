// site/src/db/users.rs

use crate::models::{EmailVerification, User};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str =
  "id, email, password_hash, first_name, last_name, email_confirmed, created_at, updated_at";

pub async fn insert_user(pool: &PgPool, email: &str, password_hash: &str) -> Result<User, sqlx::Error> {
  sqlx::query_as::<_, User>(&format!(
    "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
    USER_COLUMNS
  ))
  .bind(Uuid::new_v4())
  .bind(email)
  .bind(password_hash)
  .fetch_one(pool)
  .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
  sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE lower(email) = lower($1)", USER_COLUMNS))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
  sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Whether another account already uses this address.
pub async fn email_taken(pool: &PgPool, email: &str, except: Option<Uuid>) -> Result<bool, sqlx::Error> {
  sqlx::query_scalar::<_, bool>(
    "SELECT EXISTS (SELECT 1 FROM users WHERE lower(email) = lower($1) AND ($2::uuid IS NULL OR id <> $2))",
  )
  .bind(email)
  .bind(except)
  .fetch_one(pool)
  .await
}

/// Saves profile fields. A changed address starts out unconfirmed.
pub async fn update_profile(
  pool: &PgPool,
  user_id: Uuid,
  first_name: &str,
  last_name: &str,
  email: &str,
  email_confirmed: bool,
) -> Result<User, sqlx::Error> {
  sqlx::query_as::<_, User>(&format!(
    "UPDATE users SET first_name = $2, last_name = $3, email = $4, email_confirmed = $5, updated_at = now() \
     WHERE id = $1 RETURNING {}",
    USER_COLUMNS
  ))
  .bind(user_id)
  .bind(first_name)
  .bind(last_name)
  .bind(email)
  .bind(email_confirmed)
  .fetch_one(pool)
  .await
}

pub async fn insert_verification(
  pool: &PgPool,
  token: &str,
  user: &User,
  issued_at: DateTime<Utc>,
) -> Result<EmailVerification, sqlx::Error> {
  sqlx::query_as::<_, EmailVerification>(
    "INSERT INTO email_verifications (token, user_id, email, created_at, expires_at) \
     VALUES ($1, $2, $3, $4, $5) RETURNING token, user_id, email, created_at, expires_at",
  )
  .bind(token)
  .bind(user.id)
  .bind(&user.email)
  .bind(issued_at)
  .bind(EmailVerification::expiry_from(issued_at))
  .fetch_one(pool)
  .await
}

/// Removes the token and returns it, so a link works at most once.
pub async fn take_verification(pool: &PgPool, token: &str) -> Result<Option<EmailVerification>, sqlx::Error> {
  sqlx::query_as::<_, EmailVerification>(
    "DELETE FROM email_verifications WHERE token = $1 RETURNING token, user_id, email, created_at, expires_at",
  )
  .bind(token)
  .fetch_optional(pool)
  .await
}

pub async fn confirm_email(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
  sqlx::query("UPDATE users SET email_confirmed = TRUE, updated_at = now() WHERE id = $1")
    .bind(user_id)
    .execute(pool)
    .await?;
  sqlx::query("DELETE FROM email_verifications WHERE user_id = $1")
    .bind(user_id)
    .execute(pool)
    .await?;
  Ok(())
}
