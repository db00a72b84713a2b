use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use tracing::error;

use crate::config::Config;
use crate::search::display::render_results;

/// Interactive prompt loop. Type `exit` to quit; empty input re-prompts.
pub async fn run(collection: Option<String>, limit: Option<usize>) -> Result<()> {
    let root = std::env::current_dir()?;
    let config = Config::load(&root).unwrap_or_default();

    let collection = collection.unwrap_or_else(|| config.search.collection.clone());
    let limit = limit.unwrap_or(config.search.default_limit);

    let engine = super::build_engine(&config)?;

    println!("{}", style("Student profile hybrid search").bold());
    println!("Collection: {collection}");
    println!("Type 'exit' to quit\n");

    let theme = ColorfulTheme::default();

    loop {
        let query: String = Input::with_theme(&theme)
            .with_prompt("Search query")
            .allow_empty(true)
            .interact_text()?;
        let query = query.trim().to_string();

        if query.eq_ignore_ascii_case("exit") {
            break;
        }
        if query.is_empty() {
            continue;
        }

        match engine.search(&query, &collection, limit).await {
            Ok(results) => print!("{}", render_results(&results, &query)),
            Err(err) => {
                error!(error = %err, "Search failed");
                eprintln!("Search failed: {err}");
            }
        }
    }

    Ok(())
}
