//! In-memory store

use super::Store;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Process-local [`Store`] implementation
///
/// Nothing survives the process. Useful for tests and for runs where
/// completion tracking is only wanted within a single invocation.
///
/// # Examples
///
/// ```
/// use playlist_dl::store::{MemoryStore, Store};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// store.set_add("downloaded_videos", "abc").await?;
/// assert!(store.set_contains("downloaded_videos", "abc").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MemoryStore {
    sets: RwLock<HashMap<String, HashSet<String>>>,
    /// Values with their expiry; `None` never expires
    entries: RwLock<HashMap<String, (Vec<u8>, Option<Instant>)>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members in a set
    pub async fn set_len(&self, set_key: &str) -> usize {
        self.sets
            .read()
            .await
            .get(set_key)
            .map_or(0, HashSet::len)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn set_contains(&self, set_key: &str, member: &str) -> crate::Result<bool> {
        Ok(self
            .sets
            .read()
            .await
            .get(set_key)
            .is_some_and(|set| set.contains(member)))
    }

    async fn set_add(&self, set_key: &str, member: &str) -> crate::Result<()> {
        self.sets
            .write()
            .await
            .entry(set_key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn get_with_ttl(&self, key: &str) -> crate::Result<Option<Vec<u8>>> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some((value, expires_at)) if expires_at.is_none_or(|at| at > Instant::now()) => {
                Ok(Some(value.clone()))
            }
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> crate::Result<()> {
        // A TTL past the clock's range means the value outlives the process
        let expires_at = Instant::now().checked_add(ttl);
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_vec(), expires_at));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
