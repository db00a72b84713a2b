use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use studentrag::cli::{Cli, Commands};
use studentrag::config::Config;
use studentrag::logging::init_logging;
use studentrag::metrics;

#[tokio::main]
async fn main() -> Result<()> {
    let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let config = Config::load(&project_root).unwrap_or_default();

    // The guard MUST be held until program exit so pending logs are flushed
    let _logging_guard = init_logging(&config.logging, &project_root)?;

    tracing::info!("studentrag starting up");

    metrics::register_metrics();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            query,
            collection,
            limit,
            json,
        } => {
            studentrag::commands::search::run(&query, collection, limit, json).await?;
        }
        Commands::Repl { collection, limit } => {
            studentrag::commands::repl::run(collection, limit).await?;
        }
        Commands::Batch {
            collection,
            throttle_ms,
        } => {
            studentrag::commands::batch::run(collection, throttle_ms).await?;
        }
        Commands::Collections => {
            studentrag::commands::collections::run().await?;
        }
        Commands::Stats { prometheus } => {
            studentrag::commands::stats::run(prometheus).await?;
        }
    }

    Ok(())
}
