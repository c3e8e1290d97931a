use async_trait::async_trait;
use chrono::Utc;

use replique_core::cart::{CartSnapshotStore, DEFAULT_SNAPSHOT_SLOT};
use replique_core::errors::ApplicationError;

use super::RepositoryError;
use crate::DbPool;

/// Cart snapshot kept in one row of `storage_slot`. Each write replaces the row.
pub struct SqlCartSnapshotStore {
    pool: DbPool,
    slot: String,
}

impl SqlCartSnapshotStore {
    pub fn new(pool: DbPool) -> Self {
        Self::with_slot(pool, DEFAULT_SNAPSHOT_SLOT)
    }

    pub fn with_slot(pool: DbPool, slot: impl Into<String>) -> Self {
        Self { pool, slot: slot.into() }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }
}

#[async_trait]
impl CartSnapshotStore for SqlCartSnapshotStore {
    async fn read_snapshot(&self) -> Result<Option<String>, ApplicationError> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM storage_slot WHERE slot = ?")
                .bind(&self.slot)
                .fetch_optional(&self.pool)
                .await
                .map_err(RepositoryError::from)?;
        Ok(payload)
    }

    async fn write_snapshot(&self, payload: String) -> Result<(), ApplicationError> {
        sqlx::query(
            "INSERT INTO storage_slot (slot, payload, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(slot) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at",
        )
        .bind(&self.slot)
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(())
    }
}
