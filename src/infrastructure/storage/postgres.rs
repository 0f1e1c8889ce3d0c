//! PostgreSQL connection pooling

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::domain::DomainError;

/// Pool settings taken from the `[database]` config section
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
}

/// Opens the shared pool.
///
/// `connect` establishes the first connection eagerly so an unreachable
/// database fails here instead of on the first request.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    info!(
        max_connections = config.max_connections,
        "Connecting to PostgreSQL..."
    );

    let pool = pool_options(config)
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

    info!("PostgreSQL connection established");

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_options_follow_database_config() {
        let config = DatabaseConfig {
            url: "postgres://db/keys".to_string(),
            max_connections: 4,
            min_connections: 2,
            connect_timeout_secs: 5,
            idle_timeout_secs: 120,
            ..Default::default()
        };

        let options = pool_options(&config);

        assert_eq!(options.get_max_connections(), 4);
        assert_eq!(options.get_min_connections(), 2);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(5));
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_default_pool_options() {
        let options = pool_options(&DatabaseConfig::default());

        assert_eq!(options.get_max_connections(), 10);
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(30));
    }
}
