//! In-memory key record repository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::key_record::{KeyRecord, KeyRecordId, KeyRecordPatch, KeyRecordRepository};
use crate::domain::{DomainError, SubjectId};

type OwnedKey = (String, String);

fn owned_key(owner: &SubjectId, id: &KeyRecordId) -> OwnedKey {
    (owner.as_str().to_string(), id.as_str().to_string())
}

/// Thread-safe in-memory repository keyed by (owner, id)
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryKeyRecordRepository {
    records: RwLock<HashMap<OwnedKey, KeyRecord>>,
}

impl InMemoryKeyRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with records
    pub fn with_records(records: Vec<KeyRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (owned_key(r.owner_id(), r.id()), r))
            .collect();

        Self {
            records: RwLock::new(map),
        }
    }
}

#[async_trait]
impl KeyRecordRepository for InMemoryKeyRecordRepository {
    async fn list_by_owner(&self, owner: &SubjectId) -> Result<Vec<KeyRecord>, DomainError> {
        let records = self
            .records
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(records
            .values()
            .filter(|r| r.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn insert(&self, record: KeyRecord) -> Result<KeyRecord, DomainError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        let key = owned_key(record.owner_id(), record.id());

        if records.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "API key with ID '{}' already exists",
                record.id()
            )));
        }

        records.insert(key, record.clone());
        Ok(record)
    }

    async fn update_owned(
        &self,
        id: &KeyRecordId,
        owner: &SubjectId,
        patch: &KeyRecordPatch,
    ) -> Result<bool, DomainError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        match records.get_mut(&owned_key(owner, id)) {
            Some(record) => {
                record.apply(patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_owned(&self, id: &KeyRecordId, owner: &SubjectId) -> Result<bool, DomainError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(records.remove(&owned_key(owner, id)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: &str) -> SubjectId {
        SubjectId::new(id).unwrap()
    }

    fn record_id(id: &str) -> KeyRecordId {
        KeyRecordId::new(id).unwrap()
    }

    fn record(id: &str, owner: &str) -> KeyRecord {
        KeyRecord::new(record_id(id), subject(owner), "svc", "secret", "token")
    }

    #[tokio::test]
    async fn test_insert_and_list_by_owner() {
        let repo = InMemoryKeyRecordRepository::new();

        repo.insert(record("k1", "user-a")).await.unwrap();
        repo.insert(record("k2", "user-a")).await.unwrap();
        repo.insert(record("k3", "user-b")).await.unwrap();

        let a = repo.list_by_owner(&subject("user-a")).await.unwrap();
        assert_eq!(a.len(), 2);
        assert!(a.iter().all(|r| r.owner_id().as_str() == "user-a"));

        let b = repo.list_by_owner(&subject("user-b")).await.unwrap();
        assert_eq!(b.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_for_same_owner_conflicts() {
        let repo = InMemoryKeyRecordRepository::new();

        repo.insert(record("k1", "user-a")).await.unwrap();
        let result = repo.insert(record("k1", "user-a")).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_same_id_for_different_owners_is_allowed() {
        let repo = InMemoryKeyRecordRepository::new();

        repo.insert(record("k1", "user-a")).await.unwrap();
        repo.insert(record("k1", "user-b")).await.unwrap();

        assert_eq!(repo.list_by_owner(&subject("user-b")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_is_owner_scoped() {
        let repo = InMemoryKeyRecordRepository::with_records(vec![record("k1", "user-a")]);
        let patch = KeyRecordPatch {
            favorite: Some(true),
            ..Default::default()
        };

        let updated = repo
            .update_owned(&record_id("k1"), &subject("user-b"), &patch)
            .await
            .unwrap();
        assert!(!updated);

        let listed = repo.list_by_owner(&subject("user-a")).await.unwrap();
        assert!(!listed[0].favorite());

        let updated = repo
            .update_owned(&record_id("k1"), &subject("user-a"), &patch)
            .await
            .unwrap();
        assert!(updated);

        let listed = repo.list_by_owner(&subject("user-a")).await.unwrap();
        assert!(listed[0].favorite());
    }

    #[tokio::test]
    async fn test_delete_is_owner_scoped() {
        let repo = InMemoryKeyRecordRepository::with_records(vec![record("k1", "user-a")]);

        assert!(!repo
            .delete_owned(&record_id("k1"), &subject("user-b"))
            .await
            .unwrap());
        assert!(repo
            .delete_owned(&record_id("k1"), &subject("user-a"))
            .await
            .unwrap());
        assert!(!repo
            .delete_owned(&record_id("k1"), &subject("user-a"))
            .await
            .unwrap());
    }
}
