// site/src/web/handlers/account_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::db::users;
use crate::errors::AppError;
use crate::models::User;
use crate::services::accounts;
use crate::state::AppState;
use crate::web::extractors::SignedInUser;

#[derive(Deserialize, Debug)]
pub struct ProfileRequestPayload {
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name: String,
  pub email: String,
}

async fn load_user(app_state: &AppState, auth_user: &SignedInUser) -> Result<User, AppError> {
  users::find_by_id(&app_state.db_pool, auth_user.user_id)
    .await?
    .ok_or_else(|| AppError::Auth("Account no longer exists.".to_string()))
}

#[instrument(name = "handler::get_profile", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_profile_handler(
  app_state: web::Data<AppState>,
  auth_user: SignedInUser,
) -> Result<HttpResponse, AppError> {
  let user = load_user(&app_state, &auth_user).await?;
  Ok(HttpResponse::Ok().json(user))
}

#[instrument(name = "handler::update_profile", skip(app_state, auth_user, req_payload), fields(user_id = %auth_user.user_id))]
pub async fn update_profile_handler(
  app_state: web::Data<AppState>,
  auth_user: SignedInUser,
  req_payload: web::Json<ProfileRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let user = load_user(&app_state, &auth_user).await?;
  let updated = accounts::update_profile(
    &app_state,
    &user,
    &req_payload.first_name,
    &req_payload.last_name,
    &req_payload.email,
  )
  .await?;

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "message": "Your profile has been updated successfully.",
      "profile": updated,
  })))
}
