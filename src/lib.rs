//! keyshelf
//!
//! Per-user storage for third-party API keys behind identity-provider sign-in:
//! - ID tokens verified against the provider's JWKS (Google Sign-In by default)
//! - Every record scoped to the verified subject
//! - PostgreSQL or in-memory storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::{AppState, KeyRecordServiceTrait};
use config::AuthConfig;
use domain::{DomainError, IdentityVerifier};
use infrastructure::identity::{KeySetSource, OidcTokenVerifier, RemoteKeySet, StaticKeySet};
use infrastructure::key_record::{
    InMemoryKeyRecordRepository, KeyRecordService, PostgresKeyRecordRepository,
};
use infrastructure::storage::{connect_pool, run_storage_migrations, StorageType, StoreStatus};
use tracing::info;

/// Build the ID token verifier from the auth settings.
///
/// An inline `jwks_json` pins the key set; otherwise keys are fetched from
/// `jwks_url` and cached.
pub fn build_identity_verifier(
    auth: &AuthConfig,
) -> Result<Arc<dyn IdentityVerifier>, DomainError> {
    let keys: Arc<dyn KeySetSource> = match auth.jwks_json.as_deref() {
        Some(json) => {
            info!("Using static JWKS from configuration");
            Arc::new(StaticKeySet::from_json(json)?)
        }
        None => {
            info!(url = %auth.jwks_url, "Using remote JWKS");
            Arc::new(RemoteKeySet::new(
                auth.jwks_url.clone(),
                Duration::from_secs(auth.jwks_cache_ttl_secs),
            )?)
        }
    };

    Ok(Arc::new(OidcTokenVerifier::new(keys, auth.verifier_config())))
}

/// Create the application state with all services initialized.
///
/// With the postgres backend this connects and migrates before returning, so a
/// store that cannot be reached aborts startup.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage_backend = config.database.storage_type()?;
    info!("Storage backend: {:?}", storage_backend);

    let (key_records, store_status): (Arc<dyn KeyRecordServiceTrait>, Arc<StoreStatus>) =
        match storage_backend {
            StorageType::Postgres => {
                let pool = connect_pool(&config.database).await?;
                let applied = run_storage_migrations(&pool).await?;
                info!(applied, "Storage migrations applied");

                let status = Arc::new(StoreStatus::for_pool(pool.clone()));
                let repository = PostgresKeyRecordRepository::new(pool, status.clone());

                (Arc::new(KeyRecordService::new(Arc::new(repository))), status)
            }
            StorageType::InMemory => {
                info!("Using in-memory storage for key records");
                (
                    Arc::new(KeyRecordService::new(Arc::new(
                        InMemoryKeyRecordRepository::new(),
                    ))),
                    Arc::new(StoreStatus::new()),
                )
            }
        };

    let identity_verifier = build_identity_verifier(&config.auth)?;

    store_status.mark_ready();
    info!("Key record store ready");

    Ok(AppState::new(key_records, identity_verifier, store_status))
}
