use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::app::app;
use crate::config::{AppConfig, StoreBackend};
use crate::database::manager::{connect_gateway, ConnectFuture, ConnectionSupervisor};
use crate::state::AppState;

pub async fn handle(mut config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.api.port = port;
    }

    let supervisor = start_supervisor(&config).await?;
    let state = AppState::new(Arc::clone(&supervisor), config.clone());

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Workspace service listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    supervisor.close().await;
    info!("Server stopped");
    Ok(())
}

/// The memory backend is ready immediately; Postgres connects in the background
/// so the server can bind and report 503 until the database is reachable.
async fn start_supervisor(config: &AppConfig) -> anyhow::Result<Arc<ConnectionSupervisor>> {
    match config.database.backend {
        StoreBackend::Memory => {
            let gateway = connect_gateway(&config.database).await?;
            Ok(ConnectionSupervisor::connected(gateway))
        }
        StoreBackend::Postgres => {
            let supervisor = ConnectionSupervisor::new();
            let database = config.database.clone();
            supervisor.spawn(database.reconnect_interval(), move || -> ConnectFuture {
                let database = database.clone();
                Box::pin(async move { connect_gateway(&database).await })
            });
            Ok(supervisor)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
