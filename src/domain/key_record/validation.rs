//! Key record validation utilities

use thiserror::Error;

/// Errors that can occur while validating a key record identifier
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KeyRecordValidationError {
    #[error("Key ID cannot be empty")]
    EmptyId,

    #[error("Key ID exceeds maximum length of {0} characters")]
    TooLong(usize),

    #[error("Key ID contains a control character")]
    ControlCharacter,
}

pub const MAX_KEY_RECORD_ID_LENGTH: usize = 128;

/// Validate a caller-supplied key record ID
///
/// Rules:
/// - Cannot be empty or whitespace only
/// - Maximum 128 characters
/// - No control characters
pub fn validate_key_record_id(id: &str) -> Result<(), KeyRecordValidationError> {
    if id.trim().is_empty() {
        return Err(KeyRecordValidationError::EmptyId);
    }

    if id.chars().count() > MAX_KEY_RECORD_ID_LENGTH {
        return Err(KeyRecordValidationError::TooLong(MAX_KEY_RECORD_ID_LENGTH));
    }

    if id.chars().any(char::is_control) {
        return Err(KeyRecordValidationError::ControlCharacter);
    }

    Ok(())
}
