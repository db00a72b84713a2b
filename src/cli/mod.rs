use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "studentrag")]
#[command(author, version, about = "Hybrid search over student placement profiles")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a one-shot hybrid search
    Search {
        /// Search query
        query: String,

        /// Collection to search (defaults to the configured one)
        #[arg(short, long)]
        collection: Option<String>,

        /// Maximum number of results to return
        #[arg(short, long)]
        limit: Option<usize>,

        /// Emit results as JSON instead of the rendered list
        #[arg(long)]
        json: bool,
    },

    /// Interactive search prompt
    Repl {
        /// Collection to search (defaults to the configured one)
        #[arg(short, long)]
        collection: Option<String>,

        /// Maximum number of results per query
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Run the canned query sweep from the config
    Batch {
        /// Collection to search (defaults to the configured one)
        #[arg(short, long)]
        collection: Option<String>,

        /// Delay between queries in milliseconds
        #[arg(long)]
        throttle_ms: Option<u64>,
    },

    /// List collections known to the vector index
    Collections,

    /// Show search metrics
    Stats {
        /// Output in Prometheus exposition format
        #[arg(long)]
        prometheus: bool,
    },
}
