// kihoko/src/store/mod.rs

//! Persistence seam of the cart core.
//!
//! Every cart operation runs inside one [`ShopTx`]. A transaction is the unit
//! of atomicity: the stock change and the cart item change of an operation are
//! either both committed or both dropped. Dropping a transaction without
//! calling [`ShopTx::commit`] rolls it back.
//!
//! Implementations must serialise concurrent writers per merchandise row once
//! [`ShopTx::lock_merchandise`] returns, and [`ShopTx::adjust_stock`] must never
//! leave `stock` below zero.

pub mod memory;

use crate::error::ShopResult;
use crate::model::{Cart, CartItem, Merchandise};
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::MemoryStore;

#[async_trait]
pub trait ShopStore: Send + Sync {
  /// Opens a new transaction.
  async fn begin(&self) -> ShopResult<Box<dyn ShopTx>>;
}

#[async_trait]
pub trait ShopTx: Send {
  /// Returns the user's cart, creating it on first access. Concurrent first
  /// calls for the same user must end up with the same cart.
  async fn get_or_create_cart(&mut self, user_id: Uuid) -> ShopResult<Cart>;

  /// Plain read, no lock taken.
  async fn find_merchandise(&mut self, merchandise_id: i64) -> ShopResult<Option<Merchandise>>;

  /// Reads the merchandise row and holds a write lock on it until the
  /// transaction ends.
  async fn lock_merchandise(&mut self, merchandise_id: i64) -> ShopResult<Option<Merchandise>>;

  async fn find_cart_item(&mut self, cart_id: i64, merchandise_id: i64) -> ShopResult<Option<CartItem>>;

  /// Items of a cart, oldest first.
  async fn list_cart_items(&mut self, cart_id: i64) -> ShopResult<Vec<CartItem>>;

  async fn insert_cart_item(&mut self, cart_id: i64, merchandise_id: i64, quantity: i32) -> ShopResult<CartItem>;

  async fn set_cart_item_quantity(&mut self, cart_item_id: i64, quantity: i32) -> ShopResult<()>;

  async fn delete_cart_item(&mut self, cart_item_id: i64) -> ShopResult<()>;

  /// Deletes every item of the cart and returns how many rows went away.
  async fn clear_cart(&mut self, cart_id: i64) -> ShopResult<u64>;

  /// Conditional `stock += delta`. Applies only when the result stays >= 0 and
  /// returns the new stock; returns `None` (and changes nothing) otherwise or
  /// when the merchandise does not exist.
  async fn adjust_stock(&mut self, merchandise_id: i64, delta: i32) -> ShopResult<Option<i32>>;

  async fn commit(self: Box<Self>) -> ShopResult<()>;
}
