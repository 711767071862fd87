// site/src/db/portfolio.rs

use crate::models::{FlashDesign, Project, ProjectImage};
use sqlx::PgPool;

const IMAGE_COLUMNS: &str = "id, project_id, image_blob, title, description, display_order, created_at";

pub async fn list_projects(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
  sqlx::query_as::<_, Project>("SELECT id, title, description, slug, featured_image_blob FROM projects ORDER BY id")
    .fetch_all(pool)
    .await
}

pub async fn find_project_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Project>, sqlx::Error> {
  sqlx::query_as::<_, Project>(
    "SELECT id, title, description, slug, featured_image_blob FROM projects WHERE slug = $1",
  )
  .bind(slug)
  .fetch_optional(pool)
  .await
}

pub async fn list_project_images(pool: &PgPool, project_id: i64) -> Result<Vec<ProjectImage>, sqlx::Error> {
  sqlx::query_as::<_, ProjectImage>(&format!(
    "SELECT {} FROM project_images WHERE project_id = $1 ORDER BY display_order, created_at, id",
    IMAGE_COLUMNS
  ))
  .bind(project_id)
  .fetch_all(pool)
  .await
}

/// Every artwork across projects, grouped by project in display order.
pub async fn list_all_project_images(pool: &PgPool) -> Result<Vec<ProjectImage>, sqlx::Error> {
  sqlx::query_as::<_, ProjectImage>(&format!(
    "SELECT {} FROM project_images ORDER BY project_id, display_order, created_at, id",
    IMAGE_COLUMNS
  ))
  .fetch_all(pool)
  .await
}

pub async fn find_project_image(pool: &PgPool, image_id: i64) -> Result<Option<ProjectImage>, sqlx::Error> {
  sqlx::query_as::<_, ProjectImage>(&format!("SELECT {} FROM project_images WHERE id = $1", IMAGE_COLUMNS))
    .bind(image_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_flash_designs(pool: &PgPool) -> Result<Vec<FlashDesign>, sqlx::Error> {
  sqlx::query_as::<_, FlashDesign>(
    "SELECT id, title, description, image_blob, is_available, display_order, created_at, updated_at \
     FROM flash_designs ORDER BY display_order, created_at DESC",
  )
  .fetch_all(pool)
  .await
}
