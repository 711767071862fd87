// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every fixture

use kihoko::{CartService, MemoryActivity, MemoryStore, Merchandise, Viewer};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

// --- Fixture ---
pub struct Shop {
  pub store: MemoryStore,
  pub service: CartService,
}

impl Shop {
  pub fn new() -> Self {
    let store = MemoryStore::new();
    let service = CartService::new(Arc::new(store.clone()));
    Self { store, service }
  }

  pub async fn stocked(&self, title: &str, stock: i32) -> Merchandise {
    self.store.add_merchandise(title, Decimal::new(2500, 2), stock).await
  }

  pub async fn stock(&self, merch: &Merchandise) -> i32 {
    self.store.stock_of(merch.id).await.unwrap_or(-1)
  }

  /// Stock plus everything carts hold for this merchandise.
  pub async fn accounted_units(&self, merch: &Merchandise) -> i32 {
    self.stock(merch).await + self.store.reserved_quantity(merch.id).await
  }
}

/// A signed-in shopper with a confirmed email and their own session stamp.
pub struct Shopper {
  pub viewer: Viewer,
  pub session: MemoryActivity,
}

impl Shopper {
  pub fn verified() -> Self {
    Self {
      viewer: Viewer::user(Uuid::new_v4(), true),
      session: MemoryActivity::new(),
    }
  }

  pub fn unverified() -> Self {
    Self {
      viewer: Viewer::user(Uuid::new_v4(), false),
      session: MemoryActivity::new(),
    }
  }

  pub fn anonymous() -> Self {
    Self {
      viewer: Viewer::anonymous(),
      session: MemoryActivity::new(),
    }
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
