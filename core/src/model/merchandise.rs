// kihoko/src/model/merchandise.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A sellable item. `stock` is what is still available after every
/// outstanding cart reservation has been taken out of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchandise {
  pub id: i64,
  pub title: String,
  pub description: String,
  pub price: Decimal,
  pub stock: i32,
}

impl Merchandise {
  pub fn is_in_stock(&self) -> bool {
    self.stock >= 1
  }

  /// Price of `quantity` units.
  pub fn line_total(&self, quantity: i32) -> Decimal {
    self.price * Decimal::from(quantity)
  }
}
