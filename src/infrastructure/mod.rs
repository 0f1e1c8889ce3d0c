//! Infrastructure layer - identity verification, storage and logging

pub mod identity;
pub mod key_record;
pub mod logging;
pub mod storage;
