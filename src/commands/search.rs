use anyhow::Result;

use crate::config::Config;
use crate::search::display::render_results;

/// Run the one-shot search command.
pub async fn run(
    query: &str,
    collection: Option<String>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let root = std::env::current_dir()?;
    let config = Config::load(&root).unwrap_or_default();

    let collection = collection.unwrap_or_else(|| config.search.collection.clone());
    let limit = limit.unwrap_or(config.search.default_limit);

    let engine = super::build_engine(&config)?;
    let results = engine.search(query, &collection, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results found for: {query}");
        println!("\nTry company names, roles, cities, or skills.");
        return Ok(());
    }

    print!("{}", render_results(&results, query));

    Ok(())
}
