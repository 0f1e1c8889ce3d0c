//! Storage infrastructure - connection pool, migrations and store status

pub mod migrations;
mod postgres;
mod status;

pub use migrations::{run_storage_migrations, Migration, PostgresMigrator, KEY_RECORDS_TABLE};
pub use postgres::connect_pool;
pub use status::{is_connection_error, StoreStatus};

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}
