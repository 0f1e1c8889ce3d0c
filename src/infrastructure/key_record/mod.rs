//! Key record infrastructure
//!
//! Repository implementations and the owner-scoped service.

mod in_memory;
mod postgres_repository;
mod service;

pub use in_memory::InMemoryKeyRecordRepository;
pub use postgres_repository::PostgresKeyRecordRepository;
pub use service::KeyRecordService;
