// site/src/db/mod.rs

//! PostgreSQL access. Queries are plain runtime `sqlx::query*` calls.

pub mod portfolio;
pub mod sessions;
pub mod shop_store;
pub mod users;

pub use sessions::SessionActivity;
pub use shop_store::PgShopStore;

use sqlx::PgPool;
use tracing::{info, instrument};

const SCHEMA: &str = include_str!("schema.sql");

#[instrument(name = "db::apply_schema", skip(pool), err(Display))]
pub async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
  // Multi-statement script, sent as one simple query.
  sqlx::raw_sql(SCHEMA).execute(pool).await?;
  info!("Database schema is up to date.");
  Ok(())
}

/// Wraps a driver error for the cart core.
pub(crate) fn store_error(err: sqlx::Error) -> kihoko::ShopError {
  kihoko::ShopError::from(anyhow::Error::new(err))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn schema_is_rerunnable() {
    let creates = SCHEMA.matches("CREATE TABLE").count();
    assert_eq!(creates, 10);
    assert_eq!(SCHEMA.matches("CREATE TABLE IF NOT EXISTS").count(), creates);
    assert_eq!(
      SCHEMA.matches("CREATE INDEX").count(),
      SCHEMA.matches("CREATE INDEX IF NOT EXISTS").count()
    );
    assert!(SCHEMA.contains("UNIQUE (cart_id, merchandise_id)"));
    assert!(SCHEMA.contains("CHECK (stock >= 0)"));
  }

  #[test]
  fn schema_comments_hold_no_statement_separators() {
    for line in SCHEMA.lines().filter(|l| l.trim_start().starts_with("--")) {
      assert!(!line.contains(';'), "separator inside comment: {}", line);
    }
  }
}
