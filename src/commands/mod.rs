pub mod batch;
pub mod collections;
pub mod repl;
pub mod search;
pub mod stats;

use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::embeddings::{EmbeddingProvider, FastEmbedProvider};
use crate::index::{ChromaIndex, VectorIndex};
use crate::search::HybridSearch;

/// Wire up the hybrid engine from configuration: HTTP index client plus the
/// local embedding model.
pub(crate) fn build_engine(config: &Config) -> Result<HybridSearch> {
    let index: Arc<dyn VectorIndex> = Arc::new(ChromaIndex::new(&config.index));
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(FastEmbedProvider::new(&config.embeddings)?);

    Ok(HybridSearch::new(index, embedder).with_snapshot_limit(config.index.max_snapshot))
}
