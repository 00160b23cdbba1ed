use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::gateway::Gateway;
use crate::database::manager::ConnectionSupervisor;
use crate::error::ApiError;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub supervisor: Arc<ConnectionSupervisor>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(supervisor: Arc<ConnectionSupervisor>, config: AppConfig) -> Self {
        Self {
            supervisor,
            config: Arc::new(config),
        }
    }

    /// Current gateway, or 503 while the connect loop is still retrying
    pub async fn gateway(&self) -> Result<Arc<dyn Gateway>, ApiError> {
        self.supervisor.gateway().await.map_err(|e| {
            tracing::debug!("Gateway unavailable: {}", e);
            ApiError::service_unavailable("Database temporarily unavailable")
        })
    }
}
