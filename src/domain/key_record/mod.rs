//! Key record domain
//!
//! Per-user API key entries, the partial-update allow-list and the
//! ownership-scoped repository seam.

mod entity;
mod patch;
mod repository;
mod validation;

pub use entity::{sort_for_listing, KeyRecord, KeyRecordId, NewKeyRecord};
pub use patch::KeyRecordPatch;
pub use repository::KeyRecordRepository;
pub use validation::{validate_key_record_id, KeyRecordValidationError, MAX_KEY_RECORD_ID_LENGTH};

#[cfg(test)]
pub use repository::MockKeyRecordRepository;
