// site/src/db/shop_store.rs

//! PostgreSQL implementation of the cart core's store traits.
//!
//! Each [`PgTx`] wraps one database transaction. Merchandise rows are locked
//! with `SELECT ... FOR UPDATE`, and stock changes go through a conditional
//! `UPDATE` guarded by `stock + delta >= 0`, backed by the table's
//! `CHECK (stock >= 0)`.

use crate::db::store_error;
use crate::models::MerchandiseImage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kihoko::{Cart, CartItem, Merchandise, ShopResult, ShopStore, ShopTx};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{instrument, trace};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct MerchandiseRow {
  id: i64,
  title: String,
  description: String,
  price: Decimal,
  stock: i32,
}

impl From<MerchandiseRow> for Merchandise {
  fn from(row: MerchandiseRow) -> Self {
    Merchandise {
      id: row.id,
      title: row.title,
      description: row.description,
      price: row.price,
      stock: row.stock,
    }
  }
}

#[derive(Debug, FromRow)]
struct CartRow {
  id: i64,
  user_id: Option<Uuid>,
  created_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
  fn from(row: CartRow) -> Self {
    Cart {
      id: row.id,
      user_id: row.user_id,
      created_at: row.created_at,
    }
  }
}

#[derive(Debug, FromRow)]
struct CartItemRow {
  id: i64,
  cart_id: i64,
  merchandise_id: i64,
  quantity: i32,
  created_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
  fn from(row: CartItemRow) -> Self {
    CartItem {
      id: row.id,
      cart_id: row.cart_id,
      merchandise_id: row.merchandise_id,
      quantity: row.quantity,
      created_at: row.created_at,
    }
  }
}

#[derive(Clone)]
pub struct PgShopStore {
  pool: PgPool,
}

impl PgShopStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Storefront listing, outside any cart transaction.
  #[instrument(name = "shop_store::list_merchandise", skip(self), err(Display))]
  pub async fn list_merchandise(&self) -> Result<Vec<Merchandise>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MerchandiseRow>(
      "SELECT id, title, description, price, stock FROM merchandise ORDER BY title, id",
    )
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(Merchandise::from).collect())
  }

  /// Images of the given merchandise, oldest first per item.
  #[instrument(name = "shop_store::list_merchandise_images", skip(self, merchandise_ids), err(Display))]
  pub async fn list_merchandise_images(&self, merchandise_ids: &[i64]) -> Result<Vec<MerchandiseImage>, sqlx::Error> {
    if merchandise_ids.is_empty() {
      return Ok(Vec::new());
    }
    sqlx::query_as::<_, MerchandiseImage>(
      "SELECT id, merchandise_id, image_blob, title FROM merchandise_images \
       WHERE merchandise_id = ANY($1) ORDER BY merchandise_id, id",
    )
    .bind(merchandise_ids)
    .fetch_all(&self.pool)
    .await
  }
}

#[async_trait]
impl ShopStore for PgShopStore {
  async fn begin(&self) -> ShopResult<Box<dyn ShopTx>> {
    let tx = self.pool.begin().await.map_err(store_error)?;
    trace!("Postgres store: transaction opened.");
    Ok(Box::new(PgTx { tx }))
  }
}

pub struct PgTx {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ShopTx for PgTx {
  async fn get_or_create_cart(&mut self, user_id: Uuid) -> ShopResult<Cart> {
    // The no-op update makes RETURNING yield the existing row on conflict.
    let row = sqlx::query_as::<_, CartRow>(
      "INSERT INTO carts (user_id) VALUES ($1) \
       ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
       RETURNING id, user_id, created_at",
    )
    .bind(user_id)
    .fetch_one(&mut *self.tx)
    .await
    .map_err(store_error)?;
    Ok(row.into())
  }

  async fn find_merchandise(&mut self, merchandise_id: i64) -> ShopResult<Option<Merchandise>> {
    let row = sqlx::query_as::<_, MerchandiseRow>(
      "SELECT id, title, description, price, stock FROM merchandise WHERE id = $1",
    )
    .bind(merchandise_id)
    .fetch_optional(&mut *self.tx)
    .await
    .map_err(store_error)?;
    Ok(row.map(Merchandise::from))
  }

  async fn lock_merchandise(&mut self, merchandise_id: i64) -> ShopResult<Option<Merchandise>> {
    let row = sqlx::query_as::<_, MerchandiseRow>(
      "SELECT id, title, description, price, stock FROM merchandise WHERE id = $1 FOR UPDATE",
    )
    .bind(merchandise_id)
    .fetch_optional(&mut *self.tx)
    .await
    .map_err(store_error)?;
    Ok(row.map(Merchandise::from))
  }

  async fn find_cart_item(&mut self, cart_id: i64, merchandise_id: i64) -> ShopResult<Option<CartItem>> {
    let row = sqlx::query_as::<_, CartItemRow>(
      "SELECT id, cart_id, merchandise_id, quantity, created_at FROM cart_items \
       WHERE cart_id = $1 AND merchandise_id = $2",
    )
    .bind(cart_id)
    .bind(merchandise_id)
    .fetch_optional(&mut *self.tx)
    .await
    .map_err(store_error)?;
    Ok(row.map(CartItem::from))
  }

  async fn list_cart_items(&mut self, cart_id: i64) -> ShopResult<Vec<CartItem>> {
    let rows = sqlx::query_as::<_, CartItemRow>(
      "SELECT id, cart_id, merchandise_id, quantity, created_at FROM cart_items \
       WHERE cart_id = $1 ORDER BY created_at, id",
    )
    .bind(cart_id)
    .fetch_all(&mut *self.tx)
    .await
    .map_err(store_error)?;
    Ok(rows.into_iter().map(CartItem::from).collect())
  }

  async fn insert_cart_item(&mut self, cart_id: i64, merchandise_id: i64, quantity: i32) -> ShopResult<CartItem> {
    let row = sqlx::query_as::<_, CartItemRow>(
      "INSERT INTO cart_items (cart_id, merchandise_id, quantity) VALUES ($1, $2, $3) \
       RETURNING id, cart_id, merchandise_id, quantity, created_at",
    )
    .bind(cart_id)
    .bind(merchandise_id)
    .bind(quantity)
    .fetch_one(&mut *self.tx)
    .await
    .map_err(store_error)?;
    Ok(row.into())
  }

  async fn set_cart_item_quantity(&mut self, cart_item_id: i64, quantity: i32) -> ShopResult<()> {
    sqlx::query("UPDATE cart_items SET quantity = $2 WHERE id = $1")
      .bind(cart_item_id)
      .bind(quantity)
      .execute(&mut *self.tx)
      .await
      .map_err(store_error)?;
    Ok(())
  }

  async fn delete_cart_item(&mut self, cart_item_id: i64) -> ShopResult<()> {
    sqlx::query("DELETE FROM cart_items WHERE id = $1")
      .bind(cart_item_id)
      .execute(&mut *self.tx)
      .await
      .map_err(store_error)?;
    Ok(())
  }

  async fn clear_cart(&mut self, cart_id: i64) -> ShopResult<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
      .bind(cart_id)
      .execute(&mut *self.tx)
      .await
      .map_err(store_error)?;
    Ok(result.rows_affected())
  }

  async fn adjust_stock(&mut self, merchandise_id: i64, delta: i32) -> ShopResult<Option<i32>> {
    let stock: Option<i32> = sqlx::query_scalar(
      "UPDATE merchandise SET stock = stock + $2 WHERE id = $1 AND stock + $2 >= 0 RETURNING stock",
    )
    .bind(merchandise_id)
    .bind(delta)
    .fetch_optional(&mut *self.tx)
    .await
    .map_err(store_error)?;
    Ok(stock)
  }

  async fn commit(self: Box<Self>) -> ShopResult<()> {
    self.tx.commit().await.map_err(store_error)?;
    trace!("Postgres store: transaction committed.");
    Ok(())
  }
}
