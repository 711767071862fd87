// kihoko/src/expiry.rs

//! Passive cart expiry.
//!
//! Nothing runs in the background. The "cart last updated" stamp lives in the
//! shopper's session and is checked once per incoming request; if the cart has
//! been idle for longer than the threshold, every reservation it holds goes
//! back to stock and the cart is emptied. A cart whose owner never returns is
//! never swept.

use crate::error::{ShopError, ShopResult};
use crate::model::Viewer;
use crate::store::ShopStore;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

pub const DEFAULT_CART_EXPIRY_HOURS: i64 = 24;

/// Session-scoped "cart last updated" value.
#[async_trait]
pub trait CartActivity: Send + Sync {
  async fn last_updated(&self) -> ShopResult<Option<DateTime<Utc>>>;

  async fn touch(&self, at: DateTime<Utc>) -> ShopResult<()>;

  async fn clear(&self) -> ShopResult<()>;
}

/// [`CartActivity`] kept in memory, one per simulated session.
#[derive(Debug, Default)]
pub struct MemoryActivity {
  stamp: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryActivity {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn stamped_at(at: DateTime<Utc>) -> Self {
    Self {
      stamp: Mutex::new(Some(at)),
    }
  }

  pub fn stamp(&self) -> Option<DateTime<Utc>> {
    *self.stamp.lock()
  }
}

#[async_trait]
impl CartActivity for MemoryActivity {
  async fn last_updated(&self) -> ShopResult<Option<DateTime<Utc>>> {
    Ok(*self.stamp.lock())
  }

  async fn touch(&self, at: DateTime<Utc>) -> ShopResult<()> {
    *self.stamp.lock() = Some(at);
    Ok(())
  }

  async fn clear(&self) -> ShopResult<()> {
    *self.stamp.lock() = None;
    Ok(())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepReport {
  /// The session carries no cart stamp.
  NotTracked,
  /// The stamp is younger than the threshold.
  Fresh,
  Swept { items_released: usize, units_released: i64 },
}

#[derive(Clone)]
pub struct ExpirySweeper {
  store: Arc<dyn ShopStore>,
  threshold: Duration,
}

impl ExpirySweeper {
  pub fn new(store: Arc<dyn ShopStore>) -> Self {
    Self::with_threshold(store, Duration::hours(DEFAULT_CART_EXPIRY_HOURS))
  }

  pub fn with_threshold(store: Arc<dyn ShopStore>, threshold: Duration) -> Self {
    Self { store, threshold }
  }

  pub fn threshold(&self) -> Duration {
    self.threshold
  }

  /// Strictly older than the threshold.
  pub fn is_expired(&self, last_updated: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - last_updated > self.threshold
  }

  /// The per-request check. Releases the viewer's reservations when the
  /// session's cart stamp has expired, then clears the stamp.
  #[instrument(name = "expiry::sweep_if_expired", skip(self, activity), fields(user_id = ?viewer.user_id))]
  pub async fn sweep_if_expired(
    &self,
    viewer: &Viewer,
    activity: &dyn CartActivity,
    now: DateTime<Utc>,
  ) -> ShopResult<SweepReport> {
    let Some(last_updated) = activity.last_updated().await? else {
      return Ok(SweepReport::NotTracked);
    };
    if !self.is_expired(last_updated, now) {
      debug!(%last_updated, "Cart stamp still fresh.");
      return Ok(SweepReport::Fresh);
    }

    let (items_released, units_released) = match viewer.user_id {
      Some(user_id) => self.release_cart(user_id).await?,
      None => (0, 0),
    };
    activity.clear().await?;

    info!(
      items_released,
      units_released, "Expired cart swept; reservations returned to stock."
    );
    Ok(SweepReport::Swept {
      items_released,
      units_released,
    })
  }

  /// Returns every item of the user's cart to stock and empties the cart, in
  /// one transaction.
  async fn release_cart(&self, user_id: Uuid) -> ShopResult<(usize, i64)> {
    let mut tx = self.store.begin().await?;
    let cart = tx.get_or_create_cart(user_id).await?;
    let mut items = tx.list_cart_items(cart.id).await?;
    // Fixed lock order across merchandise rows.
    items.sort_by_key(|item| item.merchandise_id);

    let mut units: i64 = 0;
    for item in &items {
      if tx.lock_merchandise(item.merchandise_id).await?.is_none() {
        continue;
      }
      // Dropping the transaction on error keeps the cart and stock as they were.
      tx.adjust_stock(item.merchandise_id, item.quantity)
        .await?
        .ok_or_else(|| {
          ShopError::Internal(format!(
            "Could not return {} units of merchandise {} to stock",
            item.quantity, item.merchandise_id
          ))
        })?;
      units += i64::from(item.quantity);
    }
    tx.clear_cart(cart.id).await?;
    tx.commit().await?;
    Ok((items.len(), units))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryStore;

  #[test]
  fn expiry_is_strictly_after_threshold() {
    let sweeper = ExpirySweeper::new(Arc::new(MemoryStore::new()));
    let now = Utc::now();
    assert!(!sweeper.is_expired(now - Duration::hours(24), now));
    assert!(sweeper.is_expired(now - Duration::hours(24) - Duration::seconds(1), now));
    assert!(!sweeper.is_expired(now - Duration::hours(3), now));
  }

  #[tokio::test]
  async fn anonymous_expired_stamp_is_cleared() {
    let sweeper = ExpirySweeper::new(Arc::new(MemoryStore::new()));
    let now = Utc::now();
    let activity = MemoryActivity::stamped_at(now - Duration::hours(30));

    let report = sweeper
      .sweep_if_expired(&Viewer::anonymous(), &activity, now)
      .await
      .unwrap();

    assert_eq!(
      report,
      SweepReport::Swept {
        items_released: 0,
        units_released: 0
      }
    );
    assert_eq!(activity.stamp(), None);
  }
}
