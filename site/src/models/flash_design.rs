// site/src/models/flash_design.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FlashDesign {
  pub id: i64,
  pub title: String,
  pub description: String,
  pub image_blob: String,
  pub is_available: bool,
  pub display_order: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlashSummary {
  pub available_count: usize,
  pub taken_count: usize,
}

impl FlashSummary {
  pub fn of(designs: &[FlashDesign]) -> Self {
    let available_count = designs.iter().filter(|d| d.is_available).count();
    Self {
      available_count,
      taken_count: designs.len() - available_count,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn design(id: i64, is_available: bool) -> FlashDesign {
    FlashDesign {
      id,
      title: format!("flash {}", id),
      description: String::new(),
      image_blob: format!("flash/{}.jpg", id),
      is_available,
      display_order: 0,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn counts_available_and_taken() {
    let designs = vec![design(1, true), design(2, false), design(3, true)];
    assert_eq!(
      FlashSummary::of(&designs),
      FlashSummary {
        available_count: 2,
        taken_count: 1
      }
    );
    assert_eq!(FlashSummary::of(&[]).taken_count, 0);
  }
}
