use clap::Parser;
use tracing_subscriber::EnvFilter;

use motion_workspace::cli::{self, Cli};
use motion_workspace::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.api.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting workspace service in {:?} mode", config.environment);

    cli::run(Cli::parse(), config).await
}
