//! Key record service
//!
//! Owner-scoped operations on top of a [`KeyRecordRepository`]. The owner is
//! always the verified caller; nothing in a request body can change it.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::key_record::{
    sort_for_listing, KeyRecord, KeyRecordId, KeyRecordPatch, KeyRecordRepository, NewKeyRecord,
};
use crate::domain::{DomainError, SubjectId};

const NOT_FOUND_MESSAGE: &str = "API key not found";

/// Service for managing a caller's key records
#[derive(Debug)]
pub struct KeyRecordService<R>
where
    R: KeyRecordRepository + ?Sized,
{
    repository: Arc<R>,
}

impl<R: KeyRecordRepository + ?Sized> KeyRecordService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// List the owner's records in listing order
    pub async fn list(&self, owner: &SubjectId) -> Result<Vec<KeyRecord>, DomainError> {
        let mut records = self.repository.list_by_owner(owner).await?;
        sort_for_listing(&mut records);

        debug!(count = records.len(), "Listed key records");

        Ok(records)
    }

    /// Create a record owned by `owner`
    pub async fn create(
        &self,
        owner: &SubjectId,
        new: NewKeyRecord,
    ) -> Result<KeyRecord, DomainError> {
        let record = new.into_record(owner.clone())?;
        let created = self.repository.insert(record).await?;

        info!(id = %created.id(), owner = %owner, "API key created");

        Ok(created)
    }

    /// Apply a partial update to one of the owner's records
    pub async fn update(
        &self,
        owner: &SubjectId,
        id: &str,
        patch: &KeyRecordPatch,
    ) -> Result<(), DomainError> {
        if patch.is_empty() {
            return Err(DomainError::validation("No valid fields to update"));
        }

        // An id that fails validation cannot name a stored record
        let id = KeyRecordId::new(id).map_err(|_| DomainError::not_found(NOT_FOUND_MESSAGE))?;

        if !self.repository.update_owned(&id, owner, patch).await? {
            return Err(DomainError::not_found(NOT_FOUND_MESSAGE));
        }

        info!(id = %id, owner = %owner, "API key updated");

        Ok(())
    }

    /// Delete one of the owner's records
    pub async fn delete(&self, owner: &SubjectId, id: &str) -> Result<(), DomainError> {
        let id = KeyRecordId::new(id).map_err(|_| DomainError::not_found(NOT_FOUND_MESSAGE))?;

        if !self.repository.delete_owned(&id, owner).await? {
            return Err(DomainError::not_found(NOT_FOUND_MESSAGE));
        }

        info!(id = %id, owner = %owner, "API key deleted");

        Ok(())
    }
}
