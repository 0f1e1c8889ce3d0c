//! Key record entity and related types

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::patch::KeyRecordPatch;
use super::validation::{validate_key_record_id, KeyRecordValidationError};
use crate::domain::identity::SubjectId;
use crate::domain::DomainError;

/// Caller-supplied key record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyRecordId(String);

impl KeyRecordId {
    /// Create a new KeyRecordId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, KeyRecordValidationError> {
        let id = id.into();
        validate_key_record_id(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for KeyRecordId {
    type Error = KeyRecordValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KeyRecordId> for String {
    fn from(id: KeyRecordId) -> Self {
        id.0
    }
}

impl std::fmt::Display for KeyRecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored API key entry owned by a single subject.
///
/// `owner_id` is fixed when the record is built from a [`NewKeyRecord`] and
/// has no setter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyRecord {
    id: KeyRecordId,
    owner_id: SubjectId,
    name: String,
    value: String,
    #[serde(rename = "type")]
    key_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default)]
    favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
}

impl KeyRecord {
    pub fn new(
        id: KeyRecordId,
        owner_id: SubjectId,
        name: impl Into<String>,
        value: impl Into<String>,
        key_type: impl Into<String>,
    ) -> Self {
        Self {
            id,
            owner_id,
            name: name.into(),
            value: value.into(),
            key_type: key_type.into(),
            notes: None,
            favorite: false,
            order: None,
            status: None,
            status_message: None,
            created_at: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    pub fn id(&self) -> &KeyRecordId {
        &self.id
    }

    pub fn owner_id(&self) -> &SubjectId {
        &self.owner_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn key_type(&self) -> &str {
        &self.key_type
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn favorite(&self) -> bool {
        self.favorite
    }

    pub fn order(&self) -> Option<f64> {
        self.order
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    /// Whether this record belongs to the given subject
    pub fn is_owned_by(&self, subject: &SubjectId) -> bool {
        &self.owner_id == subject
    }

    /// Apply the recognized fields of a partial update
    pub fn apply(&mut self, patch: &KeyRecordPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }

        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }

        if let Some(favorite) = patch.favorite {
            self.favorite = favorite;
        }

        if let Some(order) = patch.order {
            self.order = order;
        }
    }

    /// Listing order: `order` ascending, then `created_at`, then `id`.
    /// Records missing `order` or `created_at` sort after those that have one.
    pub fn listing_cmp(&self, other: &Self) -> Ordering {
        cmp_none_last(self.order, other.order, |a, b| a.total_cmp(&b))
            .then_with(|| {
                cmp_none_last(self.created_at(), other.created_at(), |a, b| a.cmp(b))
            })
            .then_with(|| self.id.as_str().cmp(other.id.as_str()))
    }
}

fn cmp_none_last<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort records into the deterministic listing order
pub fn sort_for_listing(records: &mut [KeyRecord]) {
    records.sort_by(KeyRecord::listing_cmp);
}

/// Client-supplied fields for a new key record.
///
/// Carries no owner: the owner is always the verified caller and is attached
/// by [`NewKeyRecord::into_record`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewKeyRecord {
    pub id: String,
    pub name: String,
    pub value: String,
    pub key_type: String,
    pub notes: Option<String>,
    pub favorite: Option<bool>,
    pub order: Option<f64>,
    pub status: Option<String>,
    pub status_message: Option<String>,
    pub created_at: Option<String>,
}

impl NewKeyRecord {
    /// Build the stored record for the given owner, defaulting `favorite` to false
    pub fn into_record(self, owner: SubjectId) -> Result<KeyRecord, DomainError> {
        let id = KeyRecordId::new(self.id).map_err(|e| DomainError::validation(e.to_string()))?;

        Ok(KeyRecord {
            id,
            owner_id: owner,
            name: self.name,
            value: self.value,
            key_type: self.key_type,
            notes: self.notes,
            favorite: self.favorite.unwrap_or(false),
            order: self.order,
            status: self.status,
            status_message: self.status_message,
            created_at: self.created_at,
        })
    }
}
