//! Migrate command - applies storage migrations and exits

use anyhow::bail;
use tracing::info;

use crate::infrastructure::storage::{connect_pool, run_storage_migrations, StorageType};

pub async fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;
    config.validate_database()?;

    if config.database.storage_type()? != StorageType::Postgres {
        bail!("Migrations only apply to the postgres backend");
    }

    let pool = connect_pool(&config.database).await?;
    let applied = run_storage_migrations(&pool).await?;

    info!(applied, "Migrations complete");
    pool.close().await;

    Ok(())
}
