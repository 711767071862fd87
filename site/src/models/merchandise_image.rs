// site/src/models/merchandise_image.rs

use serde::Serialize;
use sqlx::FromRow;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct MerchandiseImage {
  pub id: i64,
  pub merchandise_id: i64,
  pub image_blob: String,
  pub title: String,
}

impl MerchandiseImage {
  /// Images keyed by merchandise, each list kept in the input order.
  pub fn by_merchandise(images: Vec<MerchandiseImage>) -> HashMap<i64, Vec<MerchandiseImage>> {
    let mut grouped: HashMap<i64, Vec<MerchandiseImage>> = HashMap::new();
    for image in images {
      grouped.entry(image.merchandise_id).or_default().push(image);
    }
    grouped
  }
}
