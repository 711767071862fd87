// site/src/state.rs
use crate::config::AppConfig;
use crate::db::PgShopStore;
use crate::services::{Mailer, MediaClient, StripeClient};
use kihoko::{CartService, ExpirySweeper};
use sqlx::PgPool;
use std::sync::Arc;

/// Everything handlers need, built once in `main` and cloned per worker.
#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub config: Arc<AppConfig>,
  pub shop_store: PgShopStore,
  pub carts: CartService,
  pub sweeper: ExpirySweeper,
  pub mailer: Arc<Mailer>,
  pub payments: Arc<StripeClient>,
  pub media: Arc<MediaClient>,
}

impl AppState {
  pub fn new(db_pool: PgPool, config: Arc<AppConfig>) -> Self {
    let shop_store = PgShopStore::new(db_pool.clone());
    let store = Arc::new(shop_store.clone());
    let carts = CartService::new(store.clone());
    let sweeper = ExpirySweeper::with_threshold(store, chrono::Duration::hours(config.cart_expiry_hours));

    // One HTTP connection pool shared by the vendor clients.
    let http = reqwest::Client::new();
    let mailer = Arc::new(Mailer::new(http.clone(), &config));
    let payments = Arc::new(StripeClient::new(http, &config));
    let media = Arc::new(MediaClient::from_config(&config));

    Self {
      db_pool,
      config,
      shop_store,
      carts,
      sweeper,
      mailer,
      payments,
      media,
    }
  }
}
