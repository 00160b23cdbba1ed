use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, StoreBackend};
use crate::database::gateway::Gateway;
use crate::database::memory::MemoryGateway;
use crate::database::postgres::PgGateway;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database not connected")]
    NotConnected,

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type ConnectFuture = BoxFuture<'static, Result<Arc<dyn Gateway>, DatabaseError>>;

/// Owns the gateway handle for the lifetime of the process.
///
/// Requests are served as soon as the server binds; until the background connect loop
/// succeeds every gateway lookup fails with [`DatabaseError::NotConnected`].
pub struct ConnectionSupervisor {
    gateway: RwLock<Option<Arc<dyn Gateway>>>,
}

impl ConnectionSupervisor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            gateway: RwLock::new(None),
        })
    }

    /// Supervisor that is ready immediately (tests, memory backend)
    pub fn connected(gateway: Arc<dyn Gateway>) -> Arc<Self> {
        Arc::new(Self {
            gateway: RwLock::new(Some(gateway)),
        })
    }

    /// Retry `connect` every `interval` until it succeeds, then install the gateway.
    pub fn spawn<F>(self: &Arc<Self>, interval: Duration, connect: F) -> JoinHandle<()>
    where
        F: Fn() -> ConnectFuture + Send + Sync + 'static,
    {
        let supervisor = Arc::clone(self);
        tokio::spawn(async move {
            let mut attempt: u64 = 0;
            loop {
                attempt += 1;
                match connect().await {
                    Ok(gateway) => {
                        info!(backend = gateway.backend(), attempt, "Successfully connected to database");
                        *supervisor.gateway.write().await = Some(gateway);
                        return;
                    }
                    Err(e) => {
                        warn!(attempt, "Unable to connect to database: {}", e);
                        warn!("Trying again in {:?}...", interval);
                        tokio::time::sleep(interval).await;
                    }
                }
            }
        })
    }

    pub async fn gateway(&self) -> Result<Arc<dyn Gateway>, DatabaseError> {
        self.gateway
            .read()
            .await
            .clone()
            .ok_or(DatabaseError::NotConnected)
    }

    pub async fn is_ready(&self) -> bool {
        self.gateway.read().await.is_some()
    }

    /// Connected and answering queries
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.gateway().await?.ping().await
    }

    /// Drop the handle and release its connections (e.g., on shutdown)
    pub async fn close(&self) {
        if let Some(gateway) = self.gateway.write().await.take() {
            gateway.close().await;
            info!("Closed database gateway: {}", gateway.backend());
        }
    }
}

/// Build the gateway selected by configuration
pub async fn connect_gateway(config: &DatabaseConfig) -> Result<Arc<dyn Gateway>, DatabaseError> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryGateway::new())),
        StoreBackend::Postgres => {
            let gateway = PgGateway::connect(config).await?;
            if config.run_migrations {
                gateway.migrate().await?;
            }
            Ok(Arc::new(gateway))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn gateway_unavailable_until_connected() {
        let supervisor = ConnectionSupervisor::new();
        assert!(!supervisor.is_ready().await);
        assert!(matches!(supervisor.gateway().await, Err(DatabaseError::NotConnected)));
        assert!(supervisor.health_check().await.is_err());
    }

    #[tokio::test]
    async fn retries_on_fixed_interval_until_success() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let supervisor = ConnectionSupervisor::new();

        let handle = supervisor.spawn(Duration::from_millis(5), move || -> ConnectFuture {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(DatabaseError::QueryError("connection refused".into()))
                } else {
                    Ok(Arc::new(MemoryGateway::new()) as Arc<dyn Gateway>)
                }
            })
        });

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("connect loop finished")
            .expect("connect task did not panic");

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(supervisor.is_ready().await);
        supervisor.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn close_releases_gateway() {
        let supervisor = ConnectionSupervisor::connected(Arc::new(MemoryGateway::new()));
        assert!(supervisor.is_ready().await);
        supervisor.close().await;
        assert!(!supervisor.is_ready().await);
    }

    #[tokio::test]
    async fn memory_backend_selected_by_config() {
        let mut config = crate::config::AppConfig::development().database;
        config.backend = StoreBackend::Memory;
        let gateway = connect_gateway(&config).await.unwrap();
        assert_eq!(gateway.backend(), "memory");
    }
}
