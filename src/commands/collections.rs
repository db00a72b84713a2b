use anyhow::Result;

use crate::config::Config;
use crate::index::{ChromaIndex, VectorIndex};

/// List collections known to the vector index.
pub async fn run() -> Result<()> {
    let root = std::env::current_dir()?;
    let config = Config::load(&root).unwrap_or_default();

    let index = ChromaIndex::new(&config.index);
    let collections = index.list_collections().await?;

    if collections.is_empty() {
        println!("No collections found at {}", config.index.url);
        return Ok(());
    }

    println!("Collections at {}:\n", config.index.url);
    for collection in collections {
        println!("  {}  {}", collection.id, collection.name);
    }

    Ok(())
}
