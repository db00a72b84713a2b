use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use anyhow::Result;
use async_trait::async_trait;

use super::provider::EmbeddingProvider;

/// Deterministic embedding provider for tests.
///
/// Vectors are derived from a hash of the input text, so equal texts map to
/// equal vectors (distance 0) and distinct texts land elsewhere on the unit
/// sphere. No model download, no I/O.
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish() | 1;

        let mut vector: Vec<f32> = (0..self.dimension)
            .map(|_| {
                // xorshift keeps the components well spread without pulling
                // in an RNG crate
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                ((state % 2000) as f32 / 1000.0) - 1.0
            })
            .collect();

        let magnitude = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for component in &mut vector {
                *component /= magnitude;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        Ok(self.vector_for(query))
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
