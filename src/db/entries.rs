//! Expiring key-value entries.

use crate::error::StoreError;
use crate::{Error, Result};
use std::time::Duration;

use super::{Database, now_millis};

impl Database {
    /// Read an entry if it exists and has not expired
    pub async fn get_entry(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value: Option<Vec<u8>> = sqlx::query_scalar(
            r#"
            SELECT value FROM kv_entries WHERE key = ? AND expires_at > ?
            "#,
        )
        .bind(key)
        .bind(now_millis())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Store(StoreError::Unavailable(format!(
                "Failed to read entry: {}",
                e
            )))
        })?;

        Ok(value)
    }

    /// Insert or replace an entry with a time-to-live
    pub async fn put_entry(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let now = now_millis();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(ttl_ms);

        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, expires_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Store(StoreError::Unavailable(format!(
                "Failed to write entry: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Delete all expired entries
    ///
    /// Returns the number of rows removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM kv_entries WHERE expires_at <= ?")
            .bind(now_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Store(StoreError::Unavailable(format!(
                    "Failed to purge expired entries: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected())
    }
}
