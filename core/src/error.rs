// kihoko/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures of the cart core.
///
/// Expected business conditions (out of stock, unverified email, ...) are NOT
/// errors; they come back as [`crate::CartRejection`] inside a
/// [`crate::CartOutcome`]. Only missing records and backend failures land here.
#[derive(Debug, Error)]
pub enum ShopError {
  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: String },

  #[error("Store operation failed. Source: {source}")]
  Store {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal shop error: {0}")]
  Internal(String),
}

impl ShopError {
  pub fn merchandise_not_found(merchandise_id: i64) -> Self {
    ShopError::NotFound {
      entity: "Merchandise",
      id: merchandise_id.to_string(),
    }
  }

  pub fn cart_item_not_found(cart_id: i64, merchandise_id: i64) -> Self {
    ShopError::NotFound {
      entity: "Cart item",
      id: format!("cart {} / merchandise {}", cart_id, merchandise_id),
    }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, ShopError::NotFound { .. })
  }
}

// Store backends convert their driver errors through anyhow.
impl From<AnyhowError> for ShopError {
  fn from(err: AnyhowError) -> Self {
    ShopError::Store { source: err }
  }
}

pub type ShopResult<T, E = ShopError> = std::result::Result<T, E>;
