//! Ankyra CLI - container registry provisioning for Themis build pipelines.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ankyra=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Create(args) => commands::create::run(args).await,
        Commands::Version => {
            println!("ankyra {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
