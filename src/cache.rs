//! Metadata cache
//!
//! Resolving a URL into metadata is the slowest part of a run that has
//! nothing left to fetch. [`MetadataCache`] keeps the raw resolution result
//! in the [`Store`] for a bounded time, keyed by URL.
//!
//! Reads never fail: a miss, an expired entry, an unreachable store and an
//! undecodable entry all look like "absent".

use crate::error::Result;
use crate::store::Store;
use crate::types::RawMetadata;
use std::sync::Arc;
use std::time::Duration;

/// URL-keyed cache of raw metadata
#[derive(Clone)]
pub struct MetadataCache {
    store: Arc<dyn Store>,
    key_prefix: String,
}

impl MetadataCache {
    /// Create a cache whose keys start with `key_prefix`
    pub fn new(store: Arc<dyn Store>, key_prefix: impl Into<String>) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
        }
    }

    /// Cache key for a URL
    ///
    /// URLs that parse are normalised first so trivially different spellings
    /// (host case, default port) share an entry.
    pub fn key_for(&self, url: &str) -> String {
        let normalized = url::Url::parse(url)
            .map(String::from)
            .unwrap_or_else(|_| url.to_string());
        format!("{}{}", self.key_prefix, normalized)
    }

    /// Look up cached metadata for a URL
    pub async fn get(&self, url: &str) -> Option<RawMetadata> {
        let key = self.key_for(url);

        let bytes = match self.store.get_with_ttl(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!(key = %key, "Metadata cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Metadata cache unavailable, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice::<RawMetadata>(&bytes) {
            Ok(metadata) => {
                tracing::debug!(key = %key, "Metadata cache hit");
                Some(metadata)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding undecodable metadata cache entry");
                None
            }
        }
    }

    /// Store metadata for a URL, replacing any existing entry
    pub async fn put(&self, url: &str, metadata: &RawMetadata, ttl: Duration) -> Result<()> {
        let key = self.key_for(url);
        let bytes = serde_json::to_vec(metadata)?;
        self.store.set_with_ttl(&key, &bytes, ttl).await
    }
}
