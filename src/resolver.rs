//! URL resolution into collections
//!
//! [`ItemResolver`] turns a URL into a [`Collection`]: a playlist resolves to
//! its entries in order, a single item to a one-element collection titled
//! after the item. Raw metadata is cached through [`MetadataCache`] so
//! repeated runs within the TTL skip the extraction step.

use crate::cache::MetadataCache;
use crate::error::{Error, ResolutionError, Result};
use crate::fetcher::Fetcher;
use crate::types::{Collection, ItemDescriptor, ItemId, RawMetadata};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Placeholder for missing titles
const UNTITLED: &str = "NA";

/// Collection plus where its metadata came from
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The resolved collection
    pub collection: Collection,
    /// Whether the metadata was served from the cache
    pub from_cache: bool,
}

/// Resolves URLs into collections, consulting the metadata cache first
#[derive(Clone)]
pub struct ItemResolver {
    fetcher: Arc<dyn Fetcher>,
    cache: MetadataCache,
    ttl: Duration,
    drop_malformed_entries: bool,
}

impl ItemResolver {
    /// Create a resolver
    ///
    /// `ttl` applies to metadata stored after a cache miss.
    /// `drop_malformed_entries` controls whether null or empty collection
    /// entries are dropped or kept as id-less items.
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: MetadataCache,
        ttl: Duration,
        drop_malformed_entries: bool,
    ) -> Self {
        Self {
            fetcher,
            cache,
            ttl,
            drop_malformed_entries,
        }
    }

    /// Resolve a URL into a collection
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolution` (or whatever the fetcher reports) when the
    /// metadata cannot be extracted. Cache failures never surface.
    pub async fn resolve(&self, url: &str) -> Result<Collection> {
        Ok(self.resolve_detailed(url).await?.collection)
    }

    /// Resolve a URL, also reporting whether the cache was used
    pub async fn resolve_detailed(&self, url: &str) -> Result<Resolution> {
        if let Some(cached) = self.cache.get(url).await {
            match decode(&cached, self.drop_malformed_entries) {
                Some(collection) => {
                    tracing::info!(url, title = %collection.title, "Using cached metadata");
                    return Ok(Resolution {
                        collection,
                        from_cache: true,
                    });
                }
                None => {
                    tracing::warn!(url, "Cached metadata has an unexpected shape, resolving again");
                }
            }
        }

        tracing::info!(url, fetcher = self.fetcher.name(), "Resolving metadata");
        let metadata = self.fetcher.resolve_metadata(url).await?;

        if let Err(e) = self.cache.put(url, &metadata, self.ttl).await {
            tracing::warn!(url, error = %e, "Failed to cache metadata");
        }

        let collection = decode(&metadata, self.drop_malformed_entries).ok_or_else(|| {
            Error::Resolution(ResolutionError::InvalidMetadata {
                url: url.to_string(),
                reason: "top-level value is not an object".to_string(),
            })
        })?;

        Ok(Resolution {
            collection,
            from_cache: false,
        })
    }
}

/// Decode raw metadata into a collection
///
/// An `entries` array (even an empty one) marks a collection; anything else
/// is a single item. Returns `None` when the top-level value is not an
/// object.
pub fn decode(metadata: &RawMetadata, drop_malformed_entries: bool) -> Option<Collection> {
    let info = metadata.as_value().as_object()?;

    match info.get("entries") {
        Some(Value::Array(entries)) => {
            let title = collection_title(info);
            let mut items = Vec::with_capacity(entries.len());
            collect_entries(entries, &title, drop_malformed_entries, &mut items);
            tracing::info!(title = %title, items = items.len(), "Resolved collection");
            Some(Collection { title, items })
        }
        _ => {
            let title = string_field(info, "title").unwrap_or(UNTITLED).to_string();
            let item = describe(info, &title);
            tracing::info!(title = %item.title, "Resolved single item");
            Some(Collection {
                title,
                items: vec![item],
            })
        }
    }
}

/// Flatten entries in order, descending into nested collections
fn collect_entries(
    entries: &[Value],
    collection_title: &str,
    drop_malformed_entries: bool,
    items: &mut Vec<ItemDescriptor>,
) {
    for (index, entry) in entries.iter().enumerate() {
        match entry.as_object().filter(|object| !object.is_empty()) {
            Some(object) => match object.get("entries") {
                Some(Value::Array(nested)) => {
                    let nested_title = collection_title_or(object, collection_title);
                    collect_entries(nested, &nested_title, drop_malformed_entries, items);
                }
                _ => items.push(describe(object, collection_title)),
            },
            None if drop_malformed_entries => {
                tracing::debug!(index, collection = collection_title, "Dropping empty entry");
            }
            None => items.push(ItemDescriptor {
                id: None,
                title: UNTITLED.to_string(),
                collection_title: Some(collection_title.to_string()),
                ..Default::default()
            }),
        }
    }
}

/// Build a descriptor from one metadata object
fn describe(info: &Map<String, Value>, context_title: &str) -> ItemDescriptor {
    let collection_title = string_field(info, "playlist_title")
        .unwrap_or(context_title)
        .to_string();

    ItemDescriptor {
        id: id_field(info),
        title: string_field(info, "title").unwrap_or(UNTITLED).to_string(),
        collection_title: Some(collection_title),
        url: first_string(info, &["webpage_url", "url", "original_url"]),
        ext: string_field(info, "ext").map(str::to_string),
        extractor: first_string(info, &["extractor_key", "ie_key", "extractor"]),
    }
}

fn collection_title(info: &Map<String, Value>) -> String {
    collection_title_or(info, UNTITLED)
}

fn collection_title_or(info: &Map<String, Value>, fallback: &str) -> String {
    string_field(info, "title")
        .or_else(|| string_field(info, "playlist_title"))
        .unwrap_or(fallback)
        .to_string()
}

/// Identifier as a string; numeric ids are accepted
fn id_field(info: &Map<String, Value>) -> Option<ItemId> {
    match info.get("id")? {
        Value::String(id) if !id.trim().is_empty() => Some(ItemId::new(id.as_str())),
        Value::Number(id) => Some(ItemId::new(id.to_string())),
        _ => None,
    }
}

fn string_field<'a>(info: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    info.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn first_string(info: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| string_field(info, key))
        .map(str::to_string)
}
