// kihoko/src/store/memory.rs

//! In-process [`ShopStore`] used by tests, benches and local development.
//!
//! A transaction owns the store-wide async mutex for its whole lifetime and
//! mutates a private working copy; `commit` swaps the copy in. Transactions
//! are therefore fully serialised, which trivially satisfies the per-row
//! locking contract of [`ShopTx::lock_merchandise`].

use crate::error::{ShopError, ShopResult};
use crate::model::{Cart, CartItem, Merchandise};
use crate::store::{ShopStore, ShopTx};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, trace};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct MemoryState {
  merchandise: BTreeMap<i64, Merchandise>,
  carts: BTreeMap<i64, Cart>,
  items: BTreeMap<i64, CartItem>,
  last_id: i64,
}

impl MemoryState {
  fn next_id(&mut self) -> i64 {
    self.last_id += 1;
    self.last_id
  }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a merchandise record outside of any cart transaction (stands in for
  /// the back-office path).
  pub async fn add_merchandise(&self, title: &str, price: Decimal, stock: i32) -> Merchandise {
    let mut state = self.state.lock().await;
    let id = state.next_id();
    let merch = Merchandise {
      id,
      title: title.to_string(),
      description: String::new(),
      price,
      stock,
    };
    state.merchandise.insert(id, merch.clone());
    debug!(merchandise_id = id, stock, "Memory store: merchandise added.");
    merch
  }

  /// Back-office restock: overwrites the stock counter.
  pub async fn set_stock(&self, merchandise_id: i64, stock: i32) -> ShopResult<()> {
    let mut state = self.state.lock().await;
    let merch = state
      .merchandise
      .get_mut(&merchandise_id)
      .ok_or_else(|| ShopError::merchandise_not_found(merchandise_id))?;
    merch.stock = stock;
    Ok(())
  }

  pub async fn stock_of(&self, merchandise_id: i64) -> Option<i32> {
    self.state.lock().await.merchandise.get(&merchandise_id).map(|m| m.stock)
  }

  /// Sum of the quantities held by every cart for this merchandise.
  pub async fn reserved_quantity(&self, merchandise_id: i64) -> i32 {
    self
      .state
      .lock()
      .await
      .items
      .values()
      .filter(|item| item.merchandise_id == merchandise_id)
      .map(|item| item.quantity)
      .sum()
  }

  pub async fn cart_count(&self) -> usize {
    self.state.lock().await.carts.len()
  }
}

#[async_trait]
impl ShopStore for MemoryStore {
  async fn begin(&self) -> ShopResult<Box<dyn ShopTx>> {
    let guard = self.state.clone().lock_owned().await;
    let work = guard.clone();
    trace!("Memory store: transaction opened.");
    Ok(Box::new(MemoryTx { guard, work }))
  }
}

struct MemoryTx {
  guard: OwnedMutexGuard<MemoryState>,
  work: MemoryState,
}

#[async_trait]
impl ShopTx for MemoryTx {
  async fn get_or_create_cart(&mut self, user_id: Uuid) -> ShopResult<Cart> {
    if let Some(cart) = self.work.carts.values().find(|c| c.user_id == Some(user_id)) {
      return Ok(cart.clone());
    }
    let id = self.work.next_id();
    let cart = Cart {
      id,
      user_id: Some(user_id),
      created_at: Utc::now(),
    };
    self.work.carts.insert(id, cart.clone());
    Ok(cart)
  }

  async fn find_merchandise(&mut self, merchandise_id: i64) -> ShopResult<Option<Merchandise>> {
    Ok(self.work.merchandise.get(&merchandise_id).cloned())
  }

  async fn lock_merchandise(&mut self, merchandise_id: i64) -> ShopResult<Option<Merchandise>> {
    // The whole store is already held by this transaction.
    Ok(self.work.merchandise.get(&merchandise_id).cloned())
  }

  async fn find_cart_item(&mut self, cart_id: i64, merchandise_id: i64) -> ShopResult<Option<CartItem>> {
    Ok(
      self
        .work
        .items
        .values()
        .find(|item| item.cart_id == cart_id && item.merchandise_id == merchandise_id)
        .cloned(),
    )
  }

  async fn list_cart_items(&mut self, cart_id: i64) -> ShopResult<Vec<CartItem>> {
    // Ids are handed out monotonically, so id order is insertion order.
    Ok(
      self
        .work
        .items
        .values()
        .filter(|item| item.cart_id == cart_id)
        .cloned()
        .collect(),
    )
  }

  async fn insert_cart_item(&mut self, cart_id: i64, merchandise_id: i64, quantity: i32) -> ShopResult<CartItem> {
    if self
      .work
      .items
      .values()
      .any(|item| item.cart_id == cart_id && item.merchandise_id == merchandise_id)
    {
      return Err(ShopError::Internal(format!(
        "Cart {} already holds merchandise {}",
        cart_id, merchandise_id
      )));
    }
    let id = self.work.next_id();
    let item = CartItem {
      id,
      cart_id,
      merchandise_id,
      quantity,
      created_at: Utc::now(),
    };
    self.work.items.insert(id, item.clone());
    Ok(item)
  }

  async fn set_cart_item_quantity(&mut self, cart_item_id: i64, quantity: i32) -> ShopResult<()> {
    let item = self.work.items.get_mut(&cart_item_id).ok_or_else(|| ShopError::NotFound {
      entity: "Cart item",
      id: cart_item_id.to_string(),
    })?;
    item.quantity = quantity;
    Ok(())
  }

  async fn delete_cart_item(&mut self, cart_item_id: i64) -> ShopResult<()> {
    self.work.items.remove(&cart_item_id);
    Ok(())
  }

  async fn clear_cart(&mut self, cart_id: i64) -> ShopResult<u64> {
    let before = self.work.items.len();
    self.work.items.retain(|_, item| item.cart_id != cart_id);
    Ok((before - self.work.items.len()) as u64)
  }

  async fn adjust_stock(&mut self, merchandise_id: i64, delta: i32) -> ShopResult<Option<i32>> {
    let Some(merch) = self.work.merchandise.get_mut(&merchandise_id) else {
      return Ok(None);
    };
    match merch.stock.checked_add(delta) {
      Some(next) if next >= 0 => {
        merch.stock = next;
        Ok(Some(next))
      }
      _ => Ok(None),
    }
  }

  async fn commit(self: Box<Self>) -> ShopResult<()> {
    let MemoryTx { mut guard, work } = *self;
    *guard = work;
    trace!("Memory store: transaction committed.");
    Ok(())
  }
}
