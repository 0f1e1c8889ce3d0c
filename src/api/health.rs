//! Health endpoint

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::api::types::Json;

use super::state::AppState;

/// Health response with component status
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub checks: Vec<HealthCheck>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Ok,
    ServiceUnavailable,
}

/// Individual component health check
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /api/health
///
/// Reads the store status flags only; never issues a query.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = &state.store_status;

    let store_check = if store.is_up() {
        HealthCheck {
            name: "store".to_string(),
            status: HealthStatus::Ok,
            message: None,
        }
    } else {
        let message = if store.is_ready() {
            "Store connection is down"
        } else {
            "Store is not initialized"
        };

        HealthCheck {
            name: "store".to_string(),
            status: HealthStatus::ServiceUnavailable,
            message: Some(message.to_string()),
        }
    };

    let status = store_check.status;
    let status_code = match status {
        HealthStatus::Ok => StatusCode::OK,
        HealthStatus::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: vec![store_check],
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_value(HealthStatus::Ok).unwrap(), "OK");
        assert_eq!(
            serde_json::to_value(HealthStatus::ServiceUnavailable).unwrap(),
            "SERVICE_UNAVAILABLE"
        );
    }
}
