pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "motion-workspace")]
#[command(about = "Workspace service - workspaces, memberships and invites")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Apply the embedded SQL migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(config, port).await,
        Commands::Migrate => commands::migrate::handle(config).await,
    }
}
