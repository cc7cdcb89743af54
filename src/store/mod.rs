//! Key-value store abstraction
//!
//! The completion set and the metadata cache both persist through the
//! [`Store`] trait, which offers two primitives: set membership and
//! byte values with a time-to-live.
//!
//! Implementations:
//! - [`crate::db::Database`]: SQLite-backed, durable across restarts
//! - [`MemoryStore`]: process-local, for tests and throwaway runs
//!
//! Every fallible operation reports [`StoreError::Unavailable`] on failure.
//! Callers decide whether that is fatal; the completion gate treats it as
//! "not completed yet".
//!
//! [`StoreError::Unavailable`]: crate::error::StoreError::Unavailable

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use std::time::Duration;

/// Durable key-value store with sets and expiring values
#[async_trait]
pub trait Store: Send + Sync {
    /// Check whether `member` is in the set named `set_key`
    async fn set_contains(&self, set_key: &str, member: &str) -> crate::Result<bool>;

    /// Add `member` to the set named `set_key`
    ///
    /// Adding an existing member is a no-op.
    async fn set_add(&self, set_key: &str, member: &str) -> crate::Result<()>;

    /// Read the value under `key` if present and not expired
    async fn get_with_ttl(&self, key: &str) -> crate::Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, expiring after `ttl`
    ///
    /// Overwrites unconditionally.
    async fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> crate::Result<()>;

    /// Release connections held by the store
    async fn close(&self) {}

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
