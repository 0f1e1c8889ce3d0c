//! Caller identity extraction from provider-issued bearer tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::SubjectId;

const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Extractor that requires a verified ID token.
///
/// Resolves to the token's subject, which scopes every record operation.
/// Runs before the body is read, so unauthenticated requests never reach the store.
#[derive(Debug, Clone)]
pub struct RequireSubject(pub SubjectId);

impl FromRequestParts<AppState> for RequireSubject {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        let subject = state.identity_verifier.verify(token).await.map_err(|e| {
            debug!(error = %e, "ID token rejected");
            ApiError::unauthorized(UNAUTHORIZED_MESSAGE)
        })?;

        Ok(RequireSubject(subject))
    }
}

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        debug!("Missing Authorization header");
        return Err(ApiError::unauthorized(UNAUTHORIZED_MESSAGE));
    };

    let value = value.to_str().map_err(|_| {
        debug!("Authorization header is not valid UTF-8");
        ApiError::unauthorized(UNAUTHORIZED_MESSAGE)
    })?;

    let token = value.strip_prefix("Bearer ").map(str::trim).unwrap_or_default();

    if token.is_empty() {
        debug!("Authorization header carries no bearer token");
        return Err(ApiError::unauthorized(UNAUTHORIZED_MESSAGE));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    fn headers(value: HeaderValue) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value);
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        let headers = headers(HeaderValue::from_static("Bearer eyJhbGciOiJSUzI1NiJ9.test"));

        assert_eq!(
            extract_bearer_token(&headers).unwrap(),
            "eyJhbGciOiJSUzI1NiJ9.test"
        );
    }

    #[test]
    fn test_missing_header() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.response.error.message, UNAUTHORIZED_MESSAGE);
    }

    #[test]
    fn test_wrong_scheme() {
        let headers = headers(HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn test_empty_token() {
        let headers = headers(HeaderValue::from_static("Bearer   "));
        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn test_non_utf8_header() {
        let headers = headers(HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap());
        let err = extract_bearer_token(&headers).unwrap_err();

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
