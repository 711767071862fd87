// tests/expiry_tests.rs
mod common;

use chrono::{Duration, Utc};
use common::*;
use kihoko::{CartActivity, ExpirySweeper, MemoryActivity, ShopError, SweepReport};
use std::sync::Arc;

#[tokio::test]
async fn test_idle_cart_is_swept_back_into_stock() {
  setup_tracing();
  let shop = Shop::new();
  let shopper = Shopper::verified();
  let merch = shop.stocked("Flash print", 5).await;

  shop.service.add_item(&shopper.viewer, &shopper.session, merch.id).await.unwrap();
  shop
    .service
    .update_quantity(&shopper.viewer, &shopper.session, merch.id, 4)
    .await
    .unwrap();
  assert_eq!(shop.stock(&merch).await, 1);

  let now = Utc::now();
  shopper.session.touch(now - Duration::hours(25)).await.unwrap();
  let sweeper = ExpirySweeper::new(Arc::new(shop.store.clone()));

  let report = sweeper.sweep_if_expired(&shopper.viewer, &shopper.session, now).await.unwrap();

  assert_eq!(
    report,
    SweepReport::Swept {
      items_released: 1,
      units_released: 4
    }
  );
  assert_eq!(shop.stock(&merch).await, 5);
  let contents = shop.service.contents(&shopper.viewer).await.unwrap().unwrap();
  assert!(contents.is_empty());
  assert_eq!(shopper.session.stamp(), None);
}

#[tokio::test]
async fn test_sweep_releases_every_line() {
  setup_tracing();
  let shop = Shop::new();
  let shopper = Shopper::verified();
  let print = shop.stocked("Print", 3).await;
  let shirt = shop.stocked("Shirt", 6).await;

  shop.service.add_item(&shopper.viewer, &shopper.session, shirt.id).await.unwrap();
  shop.service.add_item(&shopper.viewer, &shopper.session, print.id).await.unwrap();
  shop
    .service
    .update_quantity(&shopper.viewer, &shopper.session, shirt.id, 3)
    .await
    .unwrap();

  let now = Utc::now();
  shopper.session.touch(now - Duration::days(3)).await.unwrap();
  let sweeper = ExpirySweeper::new(Arc::new(shop.store.clone()));
  let report = sweeper.sweep_if_expired(&shopper.viewer, &shopper.session, now).await.unwrap();

  assert_eq!(
    report,
    SweepReport::Swept {
      items_released: 2,
      units_released: 4
    }
  );
  assert_eq!(shop.stock(&print).await, 3);
  assert_eq!(shop.stock(&shirt).await, 6);
}

#[tokio::test]
async fn test_fresh_cart_is_left_alone() {
  setup_tracing();
  let shop = Shop::new();
  let shopper = Shopper::verified();
  let merch = shop.stocked("Poster", 2).await;
  shop.service.add_item(&shopper.viewer, &shopper.session, merch.id).await.unwrap();

  let sweeper = ExpirySweeper::new(Arc::new(shop.store.clone()));
  let stamped = shopper.session.stamp().unwrap();

  // Exactly at the threshold is not yet expired.
  let at_threshold = stamped + Duration::hours(24);
  let report = sweeper
    .sweep_if_expired(&shopper.viewer, &shopper.session, at_threshold)
    .await
    .unwrap();

  assert_eq!(report, SweepReport::Fresh);
  assert_eq!(shop.stock(&merch).await, 1);
  assert_eq!(shopper.session.stamp(), Some(stamped));
}

#[tokio::test]
async fn test_session_without_stamp_is_not_tracked() {
  setup_tracing();
  let shop = Shop::new();
  let sweeper = ExpirySweeper::new(Arc::new(shop.store.clone()));
  let shopper = Shopper::verified();

  let report = sweeper
    .sweep_if_expired(&shopper.viewer, &shopper.session, Utc::now())
    .await
    .unwrap();

  assert_eq!(report, SweepReport::NotTracked);
  assert_eq!(shop.store.cart_count().await, 0);
}

#[tokio::test]
async fn test_custom_threshold() {
  setup_tracing();
  let shop = Shop::new();
  let shopper = Shopper::verified();
  let merch = shop.stocked("Sticker", 1).await;
  shop.service.add_item(&shopper.viewer, &shopper.session, merch.id).await.unwrap();
  assert_eq!(shop.stock(&merch).await, 0);

  let sweeper = ExpirySweeper::with_threshold(Arc::new(shop.store.clone()), Duration::minutes(30));
  let session = MemoryActivity::stamped_at(Utc::now() - Duration::minutes(31));
  let report = sweeper.sweep_if_expired(&shopper.viewer, &session, Utc::now()).await.unwrap();

  assert!(matches!(report, SweepReport::Swept { units_released: 1, .. }));
  assert_eq!(shop.stock(&merch).await, 1);
}

#[tokio::test]
async fn test_sweep_that_cannot_return_stock_changes_nothing() {
  setup_tracing();
  let shop = Shop::new();
  let shopper = Shopper::verified();
  let merch = shop.stocked("Tote", 3).await;
  shop.service.add_item(&shopper.viewer, &shopper.session, merch.id).await.unwrap();

  // Back-office restock leaves no room to give the reserved unit back.
  shop.store.set_stock(merch.id, i32::MAX).await.unwrap();
  let now = Utc::now();
  shopper.session.touch(now - Duration::hours(25)).await.unwrap();
  let sweeper = ExpirySweeper::new(Arc::new(shop.store.clone()));

  let result = sweeper.sweep_if_expired(&shopper.viewer, &shopper.session, now).await;

  assert!(matches!(result, Err(ShopError::Internal(_))));
  assert_eq!(shop.stock(&merch).await, i32::MAX);
  assert_eq!(shop.store.reserved_quantity(merch.id).await, 1);
  assert!(shopper.session.stamp().is_some());
}
