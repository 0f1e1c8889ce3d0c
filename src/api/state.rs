//! Application state for shared services

use std::sync::Arc;

use crate::api::types::ApiError;
use crate::domain::key_record::{KeyRecord, KeyRecordPatch, KeyRecordRepository, NewKeyRecord};
use crate::domain::{DomainError, IdentityVerifier, SubjectId};
use crate::infrastructure::key_record::KeyRecordService;
use crate::infrastructure::storage::StoreStatus;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    key_records: Arc<dyn KeyRecordServiceTrait>,
    pub identity_verifier: Arc<dyn IdentityVerifier>,
    pub store_status: Arc<StoreStatus>,
}

impl AppState {
    pub fn new(
        key_records: Arc<dyn KeyRecordServiceTrait>,
        identity_verifier: Arc<dyn IdentityVerifier>,
        store_status: Arc<StoreStatus>,
    ) -> Self {
        Self {
            key_records,
            identity_verifier,
            store_status,
        }
    }

    /// Record service, or 503 until the store has been initialized
    pub fn key_records(&self) -> Result<&dyn KeyRecordServiceTrait, ApiError> {
        if !self.store_status.is_ready() {
            return Err(ApiError::unavailable("Store is not initialized"));
        }

        Ok(self.key_records.as_ref())
    }
}

/// Trait for key record service operations
#[async_trait::async_trait]
pub trait KeyRecordServiceTrait: Send + Sync {
    async fn list(&self, owner: &SubjectId) -> Result<Vec<KeyRecord>, DomainError>;
    async fn create(&self, owner: &SubjectId, new: NewKeyRecord) -> Result<KeyRecord, DomainError>;
    async fn update(
        &self,
        owner: &SubjectId,
        id: &str,
        patch: &KeyRecordPatch,
    ) -> Result<(), DomainError>;
    async fn delete(&self, owner: &SubjectId, id: &str) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl<R: KeyRecordRepository + ?Sized + 'static> KeyRecordServiceTrait for KeyRecordService<R> {
    async fn list(&self, owner: &SubjectId) -> Result<Vec<KeyRecord>, DomainError> {
        KeyRecordService::list(self, owner).await
    }

    async fn create(&self, owner: &SubjectId, new: NewKeyRecord) -> Result<KeyRecord, DomainError> {
        KeyRecordService::create(self, owner, new).await
    }

    async fn update(
        &self,
        owner: &SubjectId,
        id: &str,
        patch: &KeyRecordPatch,
    ) -> Result<(), DomainError> {
        KeyRecordService::update(self, owner, id, patch).await
    }

    async fn delete(&self, owner: &SubjectId, id: &str) -> Result<(), DomainError> {
        KeyRecordService::delete(self, owner, id).await
    }
}
