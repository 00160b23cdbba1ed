use anyhow::Context;
use tracing::info;

use crate::config::{AppConfig, StoreBackend};
use crate::database::postgres::PgGateway;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    if config.database.backend == StoreBackend::Memory {
        info!("Memory backend selected, nothing to migrate");
        return Ok(());
    }

    let gateway = PgGateway::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    gateway.migrate().await.context("failed to apply migrations")?;
    info!("Migrations applied");
    Ok(())
}
