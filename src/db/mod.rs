//! Database layer for playlist-dl
//!
//! SQLite persistence backing the [`Store`](crate::store::Store) trait.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`sets`] - Set membership (completed items)
//! - [`entries`] - Expiring values (metadata cache)

use crate::store::Store;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::time::Duration;

mod entries;
mod migrations;
mod sets;

/// Database handle for playlist-dl
pub struct Database {
    pool: SqlitePool,
}

#[async_trait]
impl Store for Database {
    async fn set_contains(&self, set_key: &str, member: &str) -> crate::Result<bool> {
        self.is_set_member(set_key, member).await
    }

    async fn set_add(&self, set_key: &str, member: &str) -> crate::Result<()> {
        self.add_set_member(set_key, member).await
    }

    async fn get_with_ttl(&self, key: &str) -> crate::Result<Option<Vec<u8>>> {
        self.get_entry(key).await
    }

    async fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> crate::Result<()> {
        self.put_entry(key, value, ttl).await
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

/// Current time as unix milliseconds
fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
