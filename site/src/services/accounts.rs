// site/src/services/accounts.rs

//! Registration, sign-in and email confirmation flows.

use crate::db::{sessions, users};
use crate::errors::{AppError, Result as AppResult};
use crate::models::User;
use crate::services::auth_service::{
  generate_token, hash_password, is_plausible_email, validate_new_password, verify_password,
};
use crate::services::mailer::{activation_email_body, Delivery, Email};
use crate::state::AppState;
use chrono::Utc;
use tracing::{info, instrument, warn};

/// A signed-in user and the bearer token of their new session.
#[derive(Debug)]
pub struct SignedIn {
  pub user: User,
  pub token: String,
}

pub fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

#[instrument(name = "accounts::register", skip(state, password, password_confirmation), fields(email = %email), err(Display))]
pub async fn register(
  state: &AppState,
  email: &str,
  password: &str,
  password_confirmation: &str,
) -> AppResult<SignedIn> {
  let email = normalize_email(email);
  if !is_plausible_email(&email) {
    return Err(AppError::Validation("Enter a valid email address.".to_string()));
  }
  validate_new_password(password, password_confirmation)?;
  if users::email_taken(&state.db_pool, &email, None).await? {
    return Err(AppError::Conflict("A user with that email already exists.".to_string()));
  }

  let password_hash = hash_password(password)?;
  let user = users::insert_user(&state.db_pool, &email, &password_hash)
    .await
    .map_err(|e| {
      if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
        AppError::Conflict("A user with that email already exists.".to_string())
      } else {
        AppError::Sqlx(e)
      }
    })?;
  info!(user_id = %user.id, "User registered.");

  after_registration(state, &user).await;

  let token = open_session(state, &user).await?;
  Ok(SignedIn { user, token })
}

/// Post-registration step: issue the activation token and mail it. A delivery
/// failure is logged; the account stays usable and the user can ask for a new
/// link.
pub async fn after_registration(state: &AppState, user: &User) {
  if let Err(e) = send_activation_email(state, user).await {
    warn!(user_id = %user.id, error = %e, "Activation email could not be sent after registration.");
  }
}

#[instrument(name = "accounts::sign_in", skip(state, password), fields(email = %email), err(Display))]
pub async fn sign_in(state: &AppState, email: &str, password: &str) -> AppResult<SignedIn> {
  let invalid = || AppError::Auth("Invalid email or password.".to_string());
  let user = users::find_by_email(&state.db_pool, &normalize_email(email))
    .await?
    .ok_or_else(invalid)?;
  if !verify_password(&user.password_hash, password)? {
    warn!(user_id = %user.id, "Sign-in refused: wrong password.");
    return Err(invalid());
  }
  let token = open_session(state, &user).await?;
  info!(user_id = %user.id, "User signed in.");
  Ok(SignedIn { user, token })
}

async fn open_session(state: &AppState, user: &User) -> AppResult<String> {
  let token = generate_token();
  sessions::create_session(&state.db_pool, &token, user.id).await?;
  Ok(token)
}

#[instrument(name = "accounts::send_activation_email", skip(state, user), fields(user_id = %user.id), err(Display))]
pub async fn send_activation_email(state: &AppState, user: &User) -> AppResult<Delivery> {
  let token = generate_token();
  users::insert_verification(&state.db_pool, &token, user, Utc::now()).await?;

  let link = format!("{}/api/auth/activate/{}", state.config.app_base_url, token);
  let body = activation_email_body(&user.first_name, &link);
  state
    .mailer
    .send(Email {
      to: &user.email,
      reply_to: None,
      subject: "Activate your email address",
      body: &body,
    })
    .await
}

/// Re-sends the activation link if the address belongs to an unconfirmed
/// account. Says nothing about whether it does.
#[instrument(name = "accounts::resend_activation", skip(state), err(Display))]
pub async fn resend_activation(state: &AppState, email: &str) -> AppResult<()> {
  let email = normalize_email(email);
  if !is_plausible_email(&email) {
    return Ok(());
  }
  match users::find_by_email(&state.db_pool, &email).await? {
    Some(user) if !user.email_confirmed => {
      send_activation_email(state, &user).await?;
    }
    _ => {}
  }
  Ok(())
}

#[instrument(name = "accounts::activate", skip(state, token), err(Display))]
pub async fn activate(state: &AppState, token: &str) -> AppResult<User> {
  let invalid = || AppError::Validation("The email verification link is invalid. Please request a new one.".to_string());

  let verification = users::take_verification(&state.db_pool, token).await?.ok_or_else(invalid)?;
  let user = users::find_by_id(&state.db_pool, verification.user_id)
    .await?
    .ok_or_else(invalid)?;
  if !verification.confirms(&user.email, Utc::now()) {
    info!(user_id = %user.id, "Activation link expired or issued for a previous address.");
    return Err(invalid());
  }

  users::confirm_email(&state.db_pool, user.id).await?;
  info!(user_id = %user.id, "Email address confirmed.");
  users::find_by_id(&state.db_pool, user.id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {}", user.id)))
}

#[instrument(name = "accounts::update_profile", skip(state, user), fields(user_id = %user.id), err(Display))]
pub async fn update_profile(
  state: &AppState,
  user: &User,
  first_name: &str,
  last_name: &str,
  email: &str,
) -> AppResult<User> {
  let email = normalize_email(email);
  if !is_plausible_email(&email) {
    return Err(AppError::Validation("Enter a valid email address.".to_string()));
  }
  if first_name.chars().count() > 150 || last_name.chars().count() > 150 {
    return Err(AppError::Validation("Names are limited to 150 characters.".to_string()));
  }

  let email_changed = !email.eq_ignore_ascii_case(&user.email);
  if email_changed && users::email_taken(&state.db_pool, &email, Some(user.id)).await? {
    return Err(AppError::Conflict("A user with that email already exists.".to_string()));
  }
  let email_confirmed = user.email_confirmed && !email_changed;

  let updated = users::update_profile(
    &state.db_pool,
    user.id,
    first_name.trim(),
    last_name.trim(),
    &email,
    email_confirmed,
  )
  .await?;

  if email_changed {
    info!("Email changed; confirmation reset.");
    // The profile is saved either way; a new link can be requested later.
    if let Err(e) = send_activation_email(state, &updated).await {
      warn!(error = %e, "Activation email for the new address could not be sent.");
    }
  }
  Ok(updated)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn emails_are_normalized() {
    assert_eq!(normalize_email("  Kiho@Kihoko.COM "), "kiho@kihoko.com");
  }

  // Needs DATABASE_URL; returns early without one.
  #[tokio::test]
  #[serial_test::serial]
  async fn email_change_survives_undeliverable_activation_mail() {
    use crate::config::AppConfig;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else { return };
    let pool = PgPoolOptions::new().max_connections(2).connect(&database_url).await.unwrap();
    crate::db::apply_schema(&pool).await.unwrap();

    // Nothing listens on the discard port, so every send fails.
    let config = AppConfig::from_lookup(|name| match name {
      "DATABASE_URL" => Some(database_url.clone()),
      "EMAIL_API_URL" => Some("http://127.0.0.1:9/v3/smtp/email".to_string()),
      "EMAIL_API_KEY" => Some("test-key".to_string()),
      _ => None,
    })
    .unwrap();
    let state = AppState::new(pool.clone(), Arc::new(config));

    let user = users::insert_user(&pool, &format!("{}@shop.test", uuid::Uuid::new_v4()), "not-a-hash")
      .await
      .unwrap();
    users::confirm_email(&pool, user.id).await.unwrap();
    let user = users::find_by_id(&pool, user.id).await.unwrap().unwrap();
    let new_email = format!("{}@shop.test", uuid::Uuid::new_v4());

    let updated = update_profile(&state, &user, "Kiho", "Ko", &new_email).await.unwrap();

    assert_eq!(updated.email, new_email);
    assert!(!updated.email_confirmed);
    assert_eq!(updated.first_name, "Kiho");
  }
}
