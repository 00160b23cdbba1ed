use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Which persistence gateway the service talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(StoreBackend::Postgres),
            "memory" | "mem" | "in-memory" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub backend: StoreBackend,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub reconnect_interval_secs: u64,
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs(self.reconnect_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub request_timeout_secs: u64,
    pub max_request_size_bytes: usize,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    /// HS256 secret for bearer tokens. Empty means the `x-user-id` header is trusted.
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
}

const DEFAULT_DATABASE_URL: &str = "postgres://root@database:5432/motion";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").or_else(|_| env::var("ENV")).as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = v;
            }
        }
        if let Ok(v) = env::var("DATABASE_BACKEND") {
            self.database.backend = StoreBackend::parse(&v).unwrap_or(self.database.backend);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RECONNECT_INTERVAL_SECS") {
            self.database.reconnect_interval_secs =
                v.parse().unwrap_or(self.database.reconnect_interval_secs);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Ok(v) = env::var("PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_LOG_LEVEL") {
            self.api.log_level = v;
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_ISSUER") {
            self.security.jwt_issuer = Some(v).filter(|s| !s.is_empty());
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                backend: StoreBackend::Postgres,
                max_connections: 10,
                connection_timeout: 30,
                reconnect_interval_secs: 5,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 8081,
                request_timeout_secs: 30,
                max_request_size_bytes: 1024 * 1024, // 1MB
                log_level: "debug".to_string(),
            },
            security: SecurityConfig {
                // "*" allows any origin
                cors_origins: vec!["*".to_string()],
                jwt_secret: String::new(),
                jwt_issuer: None,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                backend: StoreBackend::Postgres,
                max_connections: 20,
                connection_timeout: 10,
                reconnect_interval_secs: 5,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 8081,
                request_timeout_secs: 15,
                max_request_size_bytes: 512 * 1024,
                log_level: "info".to_string(),
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_issuer: None,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                backend: StoreBackend::Postgres,
                max_connections: 50,
                connection_timeout: 5,
                reconnect_interval_secs: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                port: 8081,
                request_timeout_secs: 10,
                max_request_size_bytes: 256 * 1024,
                log_level: "info".to_string(),
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_issuer: None,
            },
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }
}
