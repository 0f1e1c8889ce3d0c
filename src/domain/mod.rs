//! Domain layer - Core business logic and entities

pub mod error;
pub mod identity;
pub mod key_record;

pub use error::DomainError;
pub use identity::{IdentityVerifier, SubjectId};
pub use key_record::{
    KeyRecord, KeyRecordId, KeyRecordPatch, KeyRecordRepository, KeyRecordValidationError,
    NewKeyRecord,
};
