use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;

/// Run the canned query sweep sequentially, with a throttling delay between
/// queries so the index is not hammered.
pub async fn run(collection: Option<String>, throttle_ms: Option<u64>) -> Result<()> {
    let root = std::env::current_dir()?;
    let config = Config::load(&root).unwrap_or_default();

    let collection = collection.unwrap_or_else(|| config.search.collection.clone());
    let throttle = Duration::from_millis(throttle_ms.unwrap_or(config.batch.throttle_ms));
    let queries = &config.batch.queries;

    let engine = super::build_engine(&config)?;

    let bar = ProgressBar::new(queries.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .expect("static progress template"),
    );

    for (position, query) in queries.iter().enumerate() {
        bar.set_message(query.clone());

        match engine.search(query, &collection, config.batch.limit).await {
            Ok(results) => {
                let top = results
                    .first()
                    .map(|r| format!("{} ({:.4})", r.profile.name, r.hybrid_score))
                    .unwrap_or_else(|| "-".to_string());
                bar.println(format!(
                    "\"{}\": {} results, top: {}",
                    query,
                    results.len(),
                    top
                ));
            }
            Err(err) => {
                bar.println(format!("\"{query}\": failed: {err}"));
            }
        }

        bar.inc(1);

        if position + 1 < queries.len() {
            tokio::time::sleep(throttle).await;
        }
    }

    bar.finish_with_message("done");

    Ok(())
}
