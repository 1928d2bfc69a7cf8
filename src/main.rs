// Main entry point - Tracing, configuration and command dispatch
use clap::Parser;
use tracing_subscriber::EnvFilter;

use floor_telemetry::cli::Cli;
use floor_telemetry::commands;
use floor_telemetry::infrastructure::config::load_app_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;

    commands::run(cli.into_command(), config).await
}
