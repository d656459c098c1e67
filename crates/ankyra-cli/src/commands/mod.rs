//! CLI commands and argument parsing.

pub mod create;

use clap::{Parser, Subcommand};

/// Ankyra - Container registry provisioning for Themis build pipelines
#[derive(Parser)]
#[command(name = "ankyra")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Lazy create a container registry for ECR
    Create(create::CreateArgs),

    /// Print version information
    Version,
}
