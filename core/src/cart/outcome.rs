// kihoko/src/cart/outcome.rs

//! Results of cart operations.

use serde::Serialize;
use std::fmt;

/// Why a cart operation declined to change anything. These are ordinary,
/// user-facing answers rather than failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartRejection {
  /// No session identity.
  Unauthenticated,
  /// The user has not confirmed their email address yet.
  VerificationRequired,
  /// Merchandise stock was zero at reservation time.
  OutOfStock,
  /// The requested quantity is more than the stock can cover.
  ExceedsStock,
}

impl CartRejection {
  /// Message shown to the shopper.
  pub fn message(&self) -> &'static str {
    match self {
      CartRejection::Unauthenticated => "User is not authenticated",
      CartRejection::VerificationRequired => "Please verify your email address to shop.",
      CartRejection::OutOfStock => "The item is out of stock",
      CartRejection::ExceedsStock => "You can't add more items than available in stock",
    }
  }
}

impl fmt::Display for CartRejection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.message())
  }
}

/// Either the operation went through and produced `T`, or it was declined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOutcome<T> {
  Applied(T),
  Rejected(CartRejection),
}

impl<T> CartOutcome<T> {
  pub fn is_applied(&self) -> bool {
    matches!(self, CartOutcome::Applied(_))
  }

  pub fn rejection(&self) -> Option<CartRejection> {
    match self {
      CartOutcome::Applied(_) => None,
      CartOutcome::Rejected(reason) => Some(*reason),
    }
  }

  pub fn applied(self) -> Option<T> {
    match self {
      CartOutcome::Applied(value) => Some(value),
      CartOutcome::Rejected(_) => None,
    }
  }
}

/// What a successful add/update left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
  pub cart_id: i64,
  pub merchandise_id: i64,
  /// Quantity now held by the cart.
  pub quantity: i32,
  /// Merchandise stock after the change.
  pub stock_remaining: i32,
}

/// What a successful removal gave back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
  pub cart_id: i64,
  pub merchandise_id: i64,
  pub quantity_returned: i32,
  pub stock_remaining: i32,
}
