use anyhow::Result;
use async_trait::async_trait;

/// Boundary to the embedding model.
///
/// A provider must produce fixed-dimensionality normalized vectors; mixing
/// dimensionalities against one collection is undefined behavior, so callers
/// keep one provider per collection.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for multiple texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate the embedding for a single query string.
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>>;

    /// Dimensionality of the vectors this provider produces.
    fn embedding_dimension(&self) -> usize;

    /// Provider name for logging.
    fn provider_name(&self) -> &'static str;
}
