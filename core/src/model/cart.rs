// kihoko/src/model/cart.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Merchandise;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
  pub id: i64,
  pub user_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
}

/// One merchandise line of a cart. `quantity` units are reserved out of the
/// merchandise stock for as long as the row exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
  pub id: i64,
  pub cart_id: i64,
  pub merchandise_id: i64,
  pub quantity: i32,
  pub created_at: DateTime<Utc>,
}

/// A cart item together with the merchandise it reserves.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
  pub item: CartItem,
  pub merchandise: Merchandise,
}

impl CartLine {
  pub fn total(&self) -> Decimal {
    self.merchandise.line_total(self.item.quantity)
  }
}

/// Read model of a whole cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartContents {
  pub cart: Cart,
  pub lines: Vec<CartLine>,
  pub total: Decimal,
}

impl CartContents {
  pub fn new(cart: Cart, lines: Vec<CartLine>) -> Self {
    let total = lines.iter().map(CartLine::total).sum();
    Self { cart, lines, total }
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  pub fn quantity_of(&self, merchandise_id: i64) -> Option<i32> {
    self
      .lines
      .iter()
      .find(|line| line.item.merchandise_id == merchandise_id)
      .map(|line| line.item.quantity)
  }

  pub fn item_count(&self) -> i32 {
    self.lines.iter().map(|line| line.item.quantity).sum()
  }
}
