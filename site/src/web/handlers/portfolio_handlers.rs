// site/src/web/handlers/portfolio_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;
use tracing::{instrument, warn};

use crate::db::portfolio;
use crate::errors::AppError;
use crate::models::{FlashDesign, FlashSummary, Neighbours, Project, ProjectImage};
use crate::services::MediaClient;
use crate::state::AppState;

// --- Response DTOs ---
#[derive(Serialize, Debug)]
pub struct ProjectView {
  pub id: i64,
  pub title: String,
  pub description: String,
  pub slug: String,
  pub featured_image_url: Option<String>,
}

impl ProjectView {
  fn build(project: Project, media: &MediaClient) -> Self {
    Self {
      featured_image_url: media.url_for_opt(project.featured_image_blob.as_deref()),
      id: project.id,
      title: project.title,
      description: project.description,
      slug: project.slug,
    }
  }
}

#[derive(Serialize, Debug)]
pub struct ImageView {
  pub id: i64,
  pub project_id: i64,
  pub title: String,
  pub description: String,
  pub image_url: Option<String>,
}

impl ImageView {
  fn build(image: &ProjectImage, media: &MediaClient) -> Self {
    Self {
      id: image.id,
      project_id: image.project_id,
      title: image.title.clone(),
      description: image.description.clone(),
      image_url: media.url_for(&image.image_blob),
    }
  }
}

#[derive(Serialize, Debug)]
pub struct FlashView {
  pub id: i64,
  pub title: String,
  pub description: String,
  pub image_url: Option<String>,
  pub is_available: bool,
}

impl FlashView {
  fn build(design: &FlashDesign, media: &MediaClient) -> Self {
    Self {
      id: design.id,
      title: design.title.clone(),
      description: design.description.clone(),
      image_url: media.url_for(&design.image_blob),
      is_available: design.is_available,
    }
  }
}

// --- Handler Implementations ---

#[instrument(name = "handler::list_projects", skip(app_state))]
pub async fn list_projects_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let projects: Vec<ProjectView> = portfolio::list_projects(&app_state.db_pool)
    .await?
    .into_iter()
    .map(|p| ProjectView::build(p, &app_state.media))
    .collect();
  Ok(HttpResponse::Ok().json(projects))
}

#[instrument(name = "handler::project_detail", skip(app_state))]
pub async fn project_detail_handler(
  app_state: web::Data<AppState>,
  slug: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let project = portfolio::find_project_by_slug(&app_state.db_pool, &slug)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Project '{}'", slug)))?;
  let images: Vec<ImageView> = portfolio::list_project_images(&app_state.db_pool, project.id)
    .await?
    .iter()
    .map(|image| ImageView::build(image, &app_state.media))
    .collect();

  Ok(HttpResponse::Ok().json(json!({
      "project": ProjectView::build(project, &app_state.media),
      "images": images,
  })))
}

#[instrument(name = "handler::list_artworks", skip(app_state))]
pub async fn list_artworks_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let artworks: Vec<ImageView> = portfolio::list_all_project_images(&app_state.db_pool)
    .await?
    .iter()
    .map(|image| ImageView::build(image, &app_state.media))
    .collect();
  Ok(HttpResponse::Ok().json(artworks))
}

/// One artwork with the previous and next image of its project.
#[instrument(name = "handler::artwork_detail", skip(app_state))]
pub async fn artwork_detail_handler(
  app_state: web::Data<AppState>,
  image_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let image_id = image_id.into_inner();
  let image = portfolio::find_project_image(&app_state.db_pool, image_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Artwork {}", image_id)))?;
  let siblings = portfolio::list_project_images(&app_state.db_pool, image.project_id).await?;

  let Some(n) = Neighbours::locate(&siblings, |candidate| candidate.id == image.id) else {
    // Deleted between the two queries.
    warn!(image_id, "Artwork vanished while loading its project.");
    return Err(AppError::NotFound(format!("Artwork {}", image_id)));
  };
  let media = &app_state.media;

  Ok(HttpResponse::Ok().json(json!({
      "image": ImageView::build(n.current, media),
      "prevImage": ImageView::build(n.prev, media),
      "nextImage": ImageView::build(n.next, media),
  })))
}

#[instrument(name = "handler::flash_gallery", skip(app_state))]
pub async fn flash_gallery_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let designs = portfolio::list_flash_designs(&app_state.db_pool).await?;
  let summary = FlashSummary::of(&designs);
  let views: Vec<FlashView> = designs.iter().map(|d| FlashView::build(d, &app_state.media)).collect();

  Ok(HttpResponse::Ok().json(json!({
      "flashDesigns": views,
      "availableCount": summary.available_count,
      "takenCount": summary.taken_count,
  })))
}
