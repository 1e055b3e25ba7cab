//! Arca CLI - Database backup and restore
//!
//! This is the main entry point for the arca command-line interface.

mod cli;
mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI args
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.quiet);

    let config = cli.config.as_deref();

    // Run command
    match cli.command {
        Commands::Backup(args) => commands::backup::run(args, config).await,
        Commands::Restore(args) => commands::restore::run(args, config).await,
        Commands::List(args) => commands::list::run(args, config).await,
        Commands::Show(args) => commands::show::run(args, config).await,
        Commands::Delete(args) => commands::delete::run(args, config).await,
        Commands::Prune(args) => commands::prune::run(args, config).await,
        Commands::Reconcile(args) => commands::reconcile::run(args, config).await,
        Commands::Tick(args) => commands::tick::run(args, config).await,
        Commands::Settings(args) => commands::settings::run(args, config).await,
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
