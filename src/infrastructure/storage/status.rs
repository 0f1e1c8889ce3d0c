//! Process-wide store readiness and reachability

use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Shared view of the store connection.
///
/// `ready` is set once, after the connection and migrations succeed.
/// `reachable` follows the outcome of store calls: a connection-class
/// failure clears it and the next successful call sets it again. Reading the
/// status never touches the database.
#[derive(Debug)]
pub struct StoreStatus {
    ready: AtomicBool,
    reachable: AtomicBool,
    pool: Option<PgPool>,
}

impl StoreStatus {
    /// Status for a backend without a connection pool
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            reachable: AtomicBool::new(true),
            pool: None,
        }
    }

    /// Status that also reports the pool's closed state
    pub fn for_pool(pool: PgPool) -> Self {
        Self {
            pool: Some(pool),
            ..Self::new()
        }
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        info!("Store marked ready");
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn mark_unreachable(&self) {
        if self.reachable.swap(false, Ordering::SeqCst) {
            warn!("Store connection lost");
        }
    }

    pub fn mark_reachable(&self) {
        if !self.reachable.swap(true, Ordering::SeqCst) {
            info!("Store connection restored");
        }
    }

    /// Ready, last call reached the store, and the pool is still open
    pub fn is_up(&self) -> bool {
        self.is_ready()
            && self.reachable.load(Ordering::SeqCst)
            && self.pool.as_ref().is_none_or(|pool| !pool.is_closed())
    }
}

impl Default for StoreStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a sqlx error means the store itself could not be reached
pub fn is_connection_error(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_status_is_not_ready() {
        let status = StoreStatus::new();
        assert!(!status.is_ready());
        assert!(!status.is_up());
    }

    #[test]
    fn test_ready_status_is_up() {
        let status = StoreStatus::new();
        status.mark_ready();

        assert!(status.is_ready());
        assert!(status.is_up());
    }

    #[test]
    fn test_unreachable_then_restored() {
        let status = StoreStatus::new();
        status.mark_ready();

        status.mark_unreachable();
        assert!(status.is_ready());
        assert!(!status.is_up());

        status.mark_reachable();
        assert!(status.is_up());
    }

    #[test]
    fn test_connection_error_classification() {
        assert!(is_connection_error(&sqlx::Error::PoolTimedOut));
        assert!(is_connection_error(&sqlx::Error::PoolClosed));
        assert!(!is_connection_error(&sqlx::Error::RowNotFound));
    }
}
