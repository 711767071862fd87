// kihoko/src/cart/service.rs

//! Cart operations: resolve, view, add, update, remove.
//!
//! Each mutating operation is one store transaction: lock the merchandise row,
//! check the stock rule, then change the cart item and the stock counter
//! together.

use crate::cart::outcome::{CartOutcome, CartRejection, Release, Reservation};
use crate::error::{ShopError, ShopResult};
use crate::expiry::CartActivity;
use crate::model::{Cart, CartContents, CartLine, Viewer};
use crate::store::ShopStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct CartService {
  store: Arc<dyn ShopStore>,
}

impl CartService {
  pub fn new(store: Arc<dyn ShopStore>) -> Self {
    Self { store }
  }

  pub fn store(&self) -> &Arc<dyn ShopStore> {
    &self.store
  }

  /// The viewer's cart, created on first access. Anonymous viewers have none.
  #[instrument(name = "cart::resolve", skip(self), fields(user_id = ?viewer.user_id))]
  pub async fn resolve_cart(&self, viewer: &Viewer) -> ShopResult<Option<Cart>> {
    let Some(user_id) = viewer.user_id else {
      return Ok(None);
    };
    let mut tx = self.store.begin().await?;
    let cart = tx.get_or_create_cart(user_id).await?;
    tx.commit().await?;
    Ok(Some(cart))
  }

  /// Cart lines with their merchandise and the cart total.
  #[instrument(name = "cart::contents", skip(self), fields(user_id = ?viewer.user_id))]
  pub async fn contents(&self, viewer: &Viewer) -> ShopResult<Option<CartContents>> {
    let Some(user_id) = viewer.user_id else {
      return Ok(None);
    };
    let mut tx = self.store.begin().await?;
    let cart = tx.get_or_create_cart(user_id).await?;
    let items = tx.list_cart_items(cart.id).await?;

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
      let merchandise = tx
        .find_merchandise(item.merchandise_id)
        .await?
        .ok_or_else(|| ShopError::merchandise_not_found(item.merchandise_id))?;
      lines.push(CartLine { item, merchandise });
    }
    tx.commit().await?;
    Ok(Some(CartContents::new(cart, lines)))
  }

  /// Reserves one more unit of the merchandise for the viewer's cart.
  #[instrument(name = "cart::add_item", skip(self, activity), fields(user_id = ?viewer.user_id))]
  pub async fn add_item(
    &self,
    viewer: &Viewer,
    activity: &dyn CartActivity,
    merchandise_id: i64,
  ) -> ShopResult<CartOutcome<Reservation>> {
    let user_id = match gate(viewer) {
      Ok(user_id) => user_id,
      Err(reason) => return Ok(CartOutcome::Rejected(reason)),
    };

    let mut tx = self.store.begin().await?;
    let cart = tx.get_or_create_cart(user_id).await?;
    let merch = tx
      .lock_merchandise(merchandise_id)
      .await?
      .ok_or_else(|| ShopError::merchandise_not_found(merchandise_id))?;

    if merch.stock < 1 {
      info!(merchandise_id, "Add to cart refused: item is out of stock.");
      tx.commit().await?;
      return Ok(CartOutcome::Rejected(CartRejection::OutOfStock));
    }

    let quantity = match tx.find_cart_item(cart.id, merchandise_id).await? {
      None => {
        tx.insert_cart_item(cart.id, merchandise_id, 1).await?;
        1
      }
      Some(item) if item.quantity < merch.stock => {
        tx.set_cart_item_quantity(item.id, item.quantity + 1).await?;
        item.quantity + 1
      }
      Some(item) => {
        info!(
          merchandise_id,
          held = item.quantity,
          stock = merch.stock,
          "Add to cart refused: more than available in stock."
        );
        tx.commit().await?;
        return Ok(CartOutcome::Rejected(CartRejection::ExceedsStock));
      }
    };

    let Some(stock_remaining) = tx.adjust_stock(merchandise_id, -1).await? else {
      // Row is locked, so this only happens if the backend broke its contract.
      warn!(merchandise_id, "Stock decrement refused under lock; rolling back.");
      return Ok(CartOutcome::Rejected(CartRejection::OutOfStock));
    };
    tx.commit().await?;
    record_activity(activity).await;

    info!(merchandise_id, quantity, stock_remaining, "Item added to cart.");
    Ok(CartOutcome::Applied(Reservation {
      cart_id: cart.id,
      merchandise_id,
      quantity,
      stock_remaining,
    }))
  }

  /// Sets the quantity held by the cart. Anything below 1 is treated as 1.
  #[instrument(name = "cart::update_quantity", skip(self, activity), fields(user_id = ?viewer.user_id))]
  pub async fn update_quantity(
    &self,
    viewer: &Viewer,
    activity: &dyn CartActivity,
    merchandise_id: i64,
    requested_quantity: i32,
  ) -> ShopResult<CartOutcome<Reservation>> {
    let user_id = match gate(viewer) {
      Ok(user_id) => user_id,
      Err(reason) => return Ok(CartOutcome::Rejected(reason)),
    };
    let target = requested_quantity.max(1);

    let mut tx = self.store.begin().await?;
    let cart = tx.get_or_create_cart(user_id).await?;
    let merch = tx
      .lock_merchandise(merchandise_id)
      .await?
      .ok_or_else(|| ShopError::merchandise_not_found(merchandise_id))?;
    let item = tx
      .find_cart_item(cart.id, merchandise_id)
      .await?
      .ok_or_else(|| ShopError::cart_item_not_found(cart.id, merchandise_id))?;

    // Everything this cart could hold: what is left plus what it already has.
    let obtainable = i64::from(merch.stock) + i64::from(item.quantity);
    if i64::from(target) > obtainable {
      info!(
        merchandise_id,
        target, obtainable, "Quantity update refused: more than available in stock."
      );
      return Ok(CartOutcome::Rejected(CartRejection::ExceedsStock));
    }

    let delta = item.quantity - target;
    let Some(stock_remaining) = tx.adjust_stock(merchandise_id, delta).await? else {
      warn!(merchandise_id, delta, "Stock adjustment refused under lock; rolling back.");
      return Ok(CartOutcome::Rejected(CartRejection::ExceedsStock));
    };
    tx.set_cart_item_quantity(item.id, target).await?;
    tx.commit().await?;
    record_activity(activity).await;

    info!(
      merchandise_id,
      from = item.quantity,
      to = target,
      stock_remaining,
      "Cart item quantity updated."
    );
    Ok(CartOutcome::Applied(Reservation {
      cart_id: cart.id,
      merchandise_id,
      quantity: target,
      stock_remaining,
    }))
  }

  /// Drops the merchandise from the cart and gives its quantity back to stock.
  #[instrument(name = "cart::remove_item", skip(self, activity), fields(user_id = ?viewer.user_id))]
  pub async fn remove_item(
    &self,
    viewer: &Viewer,
    activity: &dyn CartActivity,
    merchandise_id: i64,
  ) -> ShopResult<CartOutcome<Release>> {
    let user_id = match gate(viewer) {
      Ok(user_id) => user_id,
      Err(reason) => return Ok(CartOutcome::Rejected(reason)),
    };

    let mut tx = self.store.begin().await?;
    let cart = tx.get_or_create_cart(user_id).await?;
    let merch = tx
      .lock_merchandise(merchandise_id)
      .await?
      .ok_or_else(|| ShopError::merchandise_not_found(merchandise_id))?;
    let item = tx
      .find_cart_item(cart.id, merchandise_id)
      .await?
      .ok_or_else(|| ShopError::cart_item_not_found(cart.id, merchandise_id))?;

    let stock_remaining = tx
      .adjust_stock(merch.id, item.quantity)
      .await?
      .ok_or_else(|| ShopError::Internal(format!("Could not return stock for merchandise {}", merch.id)))?;
    tx.delete_cart_item(item.id).await?;
    tx.commit().await?;
    record_activity(activity).await;

    info!(
      merchandise_id,
      quantity_returned = item.quantity,
      stock_remaining,
      "Item removed from cart."
    );
    Ok(CartOutcome::Applied(Release {
      cart_id: cart.id,
      merchandise_id,
      quantity_returned: item.quantity,
      stock_remaining,
    }))
  }
}

/// Identity checks shared by every mutating operation.
fn gate(viewer: &Viewer) -> Result<Uuid, CartRejection> {
  match viewer.user_id {
    None => {
      debug!("Cart operation without a session identity.");
      Err(CartRejection::Unauthenticated)
    }
    Some(user_id) if !viewer.email_verified => {
      warn!(%user_id, "User tried to change the cart without verifying email.");
      Err(CartRejection::VerificationRequired)
    }
    Some(user_id) => Ok(user_id),
  }
}

// The cart change is already committed; a failed stamp only delays expiry.
async fn record_activity(activity: &dyn CartActivity) {
  if let Err(e) = activity.touch(Utc::now()).await {
    warn!(error = %e, "Could not record cart activity on the session.");
  }
}
