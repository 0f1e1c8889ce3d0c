//! API key record endpoints
//!
//! Every handler is scoped to the verified caller. Records owned by someone
//! else are indistinguishable from missing ones.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api::middleware::RequireSubject;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::key_record::{KeyRecord, KeyRecordPatch, NewKeyRecord};

/// Request to store a new key record.
///
/// `owner_id`/`user_id` in the body are ignored along with any other unknown field.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateKeyRequest {
    pub id: String,
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub favorite: Option<bool>,
    #[serde(default)]
    pub order: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<CreateKeyRequest> for NewKeyRecord {
    fn from(req: CreateKeyRequest) -> Self {
        Self {
            id: req.id,
            name: req.name,
            value: req.value,
            key_type: req.key_type,
            notes: req.notes,
            favorite: req.favorite,
            order: req.order,
            status: req.status,
            status_message: req.status_message,
            created_at: req.created_at,
        }
    }
}

/// Key record as returned to its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRecordResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub favorite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&KeyRecord> for KeyRecordResponse {
    fn from(record: &KeyRecord) -> Self {
        Self {
            id: record.id().to_string(),
            owner_id: record.owner_id().to_string(),
            name: record.name().to_string(),
            value: record.value().to_string(),
            key_type: record.key_type().to_string(),
            notes: record.notes().map(String::from),
            favorite: record.favorite(),
            order: record.order(),
            status: record.status().map(String::from),
            status_message: record.status_message().map(String::from),
            created_at: record.created_at().map(String::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /api/keys
pub async fn list_keys(
    State(state): State<AppState>,
    RequireSubject(subject): RequireSubject,
) -> Result<Json<Vec<KeyRecordResponse>>, ApiError> {
    debug!(owner = %subject, "Listing API keys");

    let records = state.key_records()?.list(&subject).await?;

    Ok(Json(records.iter().map(KeyRecordResponse::from).collect()))
}

/// POST /api/keys
pub async fn create_key(
    State(state): State<AppState>,
    RequireSubject(subject): RequireSubject,
    Json(request): Json<CreateKeyRequest>,
) -> Result<(StatusCode, Json<KeyRecordResponse>), ApiError> {
    debug!(owner = %subject, id = %request.id, "Creating API key");

    let record = state
        .key_records()?
        .create(&subject, request.into())
        .await
        .map_err(ApiError::from_write_error)?;

    Ok((StatusCode::CREATED, Json(KeyRecordResponse::from(&record))))
}

/// PUT /api/keys/{id}
pub async fn update_key(
    State(state): State<AppState>,
    RequireSubject(subject): RequireSubject,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!(owner = %subject, id = %id, "Updating API key");

    let service = state.key_records()?;
    let patch = KeyRecordPatch::from_json(&body)?;

    service
        .update(&subject, &id, &patch)
        .await
        .map_err(ApiError::from_write_error)?;

    Ok(Json(MessageResponse {
        message: "Updated successfully".to_string(),
    }))
}

/// DELETE /api/keys/{id}
pub async fn delete_key(
    State(state): State<AppState>,
    RequireSubject(subject): RequireSubject,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(owner = %subject, id = %id, "Deleting API key");

    state
        .key_records()?
        .delete(&subject, &id)
        .await
        .map_err(ApiError::from_write_error)?;

    Ok(StatusCode::NO_CONTENT)
}
