//! Set membership queries.

use crate::error::StoreError;
use crate::{Error, Result};

use super::{Database, now_millis};

impl Database {
    /// Check if a member is in a set
    pub async fn is_set_member(&self, set_key: &str, member: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM kv_sets WHERE set_key = ? AND member = ?
            "#,
        )
        .bind(set_key)
        .bind(member)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            Error::Store(StoreError::Unavailable(format!(
                "Failed to check set membership: {}",
                e
            )))
        })?;

        Ok(count > 0)
    }

    /// Add a member to a set
    ///
    /// Re-adding an existing member keeps the original `added_at`.
    pub async fn add_set_member(&self, set_key: &str, member: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_sets (set_key, member, added_at)
            VALUES (?, ?, ?)
            ON CONFLICT(set_key, member) DO NOTHING
            "#,
        )
        .bind(set_key)
        .bind(member)
        .bind(now_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Store(StoreError::Unavailable(format!(
                "Failed to add set member: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Count the members of a set
    pub async fn set_len(&self, set_key: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_sets WHERE set_key = ?")
            .bind(set_key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Store(StoreError::Unavailable(format!(
                    "Failed to count set members: {}",
                    e
                )))
            })?;

        Ok(count.max(0) as u64)
    }
}
