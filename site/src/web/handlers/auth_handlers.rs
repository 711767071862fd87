// site/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::db::sessions;
use crate::errors::AppError;
use crate::services::accounts;
use crate::state::AppState;
use crate::web::extractors::SignedInUser;

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
pub struct SignupRequestPayload {
  pub email: String,
  pub password: String,
  pub password_confirmation: String,
}

#[derive(Deserialize, Debug)]
pub struct SigninRequestPayload {
  pub email: String,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct VerifyEmailRequestPayload {
  pub email: String,
}

// --- Handler Implementations ---

#[instrument(
    name = "handler::signup",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email)
)]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignupRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let signed_in = accounts::register(
    &app_state,
    &req_payload.email,
    &req_payload.password,
    &req_payload.password_confirmation,
  )
  .await?;

  Ok(HttpResponse::Created().json(json!({
      "success": true,
      "message": "Account created. Check your inbox to confirm your email address.",
      "userId": signed_in.user.id.to_string(),
      "email": signed_in.user.email,
      "token": signed_in.token,
  })))
}

#[instrument(
    name = "handler::signin",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email)
)]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SigninRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let signed_in = accounts::sign_in(&app_state, &req_payload.email, &req_payload.password).await?;

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "userId": signed_in.user.id.to_string(),
      "email": signed_in.user.email,
      "emailConfirmed": signed_in.user.email_confirmed,
      "token": signed_in.token,
  })))
}

#[instrument(name = "handler::signout", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn signout_handler(
  app_state: web::Data<AppState>,
  auth_user: SignedInUser,
) -> Result<HttpResponse, AppError> {
  sessions::delete_session(&app_state.db_pool, &auth_user.token).await?;
  info!("User signed out.");
  Ok(HttpResponse::Ok().json(json!({"success": true})))
}

/// Always answers the same way, whether or not the address is known.
#[instrument(name = "handler::verify_email", skip(app_state, req_payload))]
pub async fn verify_email_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<VerifyEmailRequestPayload>,
) -> Result<HttpResponse, AppError> {
  accounts::resend_activation(&app_state, &req_payload.email).await?;
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "message": "An email has been sent with an activation link. Please check your inbox.",
  })))
}

#[instrument(name = "handler::activate_email", skip(app_state, token))]
pub async fn activate_email_handler(
  app_state: web::Data<AppState>,
  token: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let user = accounts::activate(&app_state, &token).await?;
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "message": "Your email address has been verified successfully.",
      "email": user.email,
  })))
}
