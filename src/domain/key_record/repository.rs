//! Key record repository trait

use async_trait::async_trait;

use super::entity::{KeyRecord, KeyRecordId};
use super::patch::KeyRecordPatch;
use crate::domain::identity::SubjectId;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Ownership-scoped persistence for key records.
///
/// Every mutating call filters by both record id and owner. A `false`
/// result means no record with that id belongs to the owner; whether it
/// exists for someone else is deliberately not reported.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeyRecordRepository: Send + Sync {
    /// Lists every record owned by the subject
    async fn list_by_owner(&self, owner: &SubjectId) -> Result<Vec<KeyRecord>, DomainError>;

    /// Inserts a new record, failing with a conflict if the owner already has this id
    async fn insert(&self, record: KeyRecord) -> Result<KeyRecord, DomainError>;

    /// Applies a partial update to the owner's record
    async fn update_owned(
        &self,
        id: &KeyRecordId,
        owner: &SubjectId,
        patch: &KeyRecordPatch,
    ) -> Result<bool, DomainError>;

    /// Deletes the owner's record
    async fn delete_owned(&self, id: &KeyRecordId, owner: &SubjectId) -> Result<bool, DomainError>;
}
