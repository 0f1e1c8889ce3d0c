//! PostgreSQL key record repository
//!
//! Records are stored as JSON documents in `api_keys.data`. The `owner_id`
//! and `id` columns carry the ownership filter and the primary key; partial
//! updates merge the patch document into `data`.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;
use tracing::debug;

use crate::domain::key_record::{KeyRecord, KeyRecordId, KeyRecordPatch, KeyRecordRepository};
use crate::domain::{DomainError, SubjectId};
use crate::infrastructure::storage::{is_connection_error, StoreStatus};

#[derive(Debug, Clone)]
pub struct PostgresKeyRecordRepository {
    pool: PgPool,
    status: Arc<StoreStatus>,
}

impl PostgresKeyRecordRepository {
    pub fn new(pool: PgPool, status: Arc<StoreStatus>) -> Self {
        Self { pool, status }
    }

    fn track<T>(&self, result: Result<T, sqlx::Error>) -> Result<T, sqlx::Error> {
        track_outcome(&self.status, result)
    }
}

/// Feeds the outcome of a store call into the shared status
fn track_outcome<T>(
    status: &StoreStatus,
    result: Result<T, sqlx::Error>,
) -> Result<T, sqlx::Error> {
    match &result {
        Ok(_) => status.mark_reachable(),
        Err(e) if is_connection_error(e) => status.mark_unreachable(),
        Err(_) => {}
    }

    result
}

/// A duplicate `(owner_id, id)` is a conflict; anything else is a store failure
fn insert_error(error: sqlx::Error, id: &KeyRecordId) -> DomainError {
    let unique_violation = error
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());

    if unique_violation {
        DomainError::conflict(format!("API key with ID '{}' already exists", id))
    } else {
        DomainError::storage(format!("Failed to create key: {}", error))
    }
}

fn decode_record(row: &sqlx::postgres::PgRow) -> Result<KeyRecord, DomainError> {
    let data: serde_json::Value = row
        .try_get("data")
        .map_err(|e| DomainError::storage(format!("Failed to read key data: {}", e)))?;

    serde_json::from_value(data)
        .map_err(|e| DomainError::storage(format!("Failed to deserialize key: {}", e)))
}

#[async_trait]
impl KeyRecordRepository for PostgresKeyRecordRepository {
    async fn list_by_owner(&self, owner: &SubjectId) -> Result<Vec<KeyRecord>, DomainError> {
        let result = sqlx::query(
            "SELECT data FROM api_keys WHERE owner_id = $1 ORDER BY created_at, id",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await;

        let rows = self
            .track(result)
            .map_err(|e| DomainError::storage(format!("Failed to list keys: {}", e)))?;

        rows.iter().map(decode_record).collect()
    }

    async fn insert(&self, record: KeyRecord) -> Result<KeyRecord, DomainError> {
        let data = serde_json::to_value(&record)
            .map_err(|e| DomainError::storage(format!("Failed to serialize key: {}", e)))?;

        let result = sqlx::query("INSERT INTO api_keys (owner_id, id, data) VALUES ($1, $2, $3)")
            .bind(record.owner_id().as_str())
            .bind(record.id().as_str())
            .bind(&data)
            .execute(&self.pool)
            .await;

        self.track(result).map_err(|e| insert_error(e, record.id()))?;

        debug!(id = %record.id(), "Inserted key record");

        Ok(record)
    }

    async fn update_owned(
        &self,
        id: &KeyRecordId,
        owner: &SubjectId,
        patch: &KeyRecordPatch,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE api_keys
            SET data = data || $3, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id.as_str())
        .bind(owner.as_str())
        .bind(patch.to_document())
        .execute(&self.pool)
        .await;

        let done = self
            .track(result)
            .map_err(|e| DomainError::storage(format!("Failed to update key: {}", e)))?;

        Ok(done.rows_affected() > 0)
    }

    async fn delete_owned(&self, id: &KeyRecordId, owner: &SubjectId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1 AND owner_id = $2")
            .bind(id.as_str())
            .bind(owner.as_str())
            .execute(&self.pool)
            .await;

        let done = self
            .track(result)
            .map_err(|e| DomainError::storage(format!("Failed to delete key: {}", e)))?;

        Ok(done.rows_affected() > 0)
    }
}
