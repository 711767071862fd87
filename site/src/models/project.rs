// site/src/models/project.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Project {
  pub id: i64,
  pub title: String,
  pub description: String,
  pub slug: String,
  pub featured_image_blob: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ProjectImage {
  pub id: i64,
  pub project_id: i64,
  pub image_blob: String,
  pub title: String,
  pub description: String,
  pub display_order: i32,
  pub created_at: DateTime<Utc>,
}

/// Previous and next entries around one item of an ordered list, wrapping at
/// both ends.
#[derive(Debug, PartialEq)]
pub struct Neighbours<'a, T> {
  pub current: &'a T,
  pub prev: &'a T,
  pub next: &'a T,
}

impl<'a, T> Neighbours<'a, T> {
  pub fn locate<F>(items: &'a [T], is_current: F) -> Option<Self>
  where
    F: Fn(&T) -> bool,
  {
    let index = items.iter().position(is_current)?;
    let prev_index = if index == 0 { items.len() - 1 } else { index - 1 };
    let next_index = (index + 1) % items.len();
    Some(Self {
      current: &items[index],
      prev: &items[prev_index],
      next: &items[next_index],
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn middle_item_has_plain_neighbours() {
    let ids = [10, 20, 30];
    let n = Neighbours::locate(&ids, |id| *id == 20).unwrap();
    assert_eq!((*n.prev, *n.current, *n.next), (10, 20, 30));
  }

  #[test]
  fn ends_wrap_around() {
    let ids = [10, 20, 30];
    let first = Neighbours::locate(&ids, |id| *id == 10).unwrap();
    assert_eq!((*first.prev, *first.next), (30, 20));
    let last = Neighbours::locate(&ids, |id| *id == 30).unwrap();
    assert_eq!((*last.prev, *last.next), (20, 10));
  }

  #[test]
  fn single_image_is_its_own_neighbour() {
    let ids = [7];
    let n = Neighbours::locate(&ids, |id| *id == 7).unwrap();
    assert_eq!((*n.prev, *n.next), (7, 7));
  }

  #[test]
  fn missing_item_has_no_neighbours() {
    let ids: [i64; 2] = [1, 2];
    assert!(Neighbours::locate(&ids, |id| *id == 3).is_none());
    let empty: [i64; 0] = [];
    assert!(Neighbours::locate(&empty, |_| true).is_none());
  }
}
