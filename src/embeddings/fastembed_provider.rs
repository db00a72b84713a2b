use anyhow::{Context, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::provider::EmbeddingProvider;
use crate::config::EmbeddingsConfig;
use crate::metrics::{EMBEDDING_LATENCY, EMBEDDING_REQUESTS};

/// Local embedding provider backed by fastembed ONNX models.
pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
    model_name: String,
    batch_size: usize,
}

impl FastEmbedProvider {
    /// Load the configured model. Downloads it on first use.
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let model_type = Self::parse_model_name(&config.model);

        info!("Loading embedding model: {}", config.model);

        let model =
            TextEmbedding::try_new(InitOptions::new(model_type).with_show_download_progress(true))
                .with_context(|| format!("Failed to initialize embedding model: {}", config.model))?;

        info!("Embedding model loaded");

        Ok(Self {
            model: Arc::new(model),
            model_name: config.model.clone(),
            batch_size: config.batch_size,
        })
    }

    /// Map a model name to the fastembed enum. The profile corpus was
    /// embedded with a 768-dimensional sentence transformer, so unknown
    /// names fall back to a 768-dimensional model rather than failing.
    fn parse_model_name(name: &str) -> EmbeddingModel {
        match name {
            "bge-base-en-v1.5" | "BAAI/bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
            "bge-small-en-v1.5" | "BAAI/bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
            "bge-large-en-v1.5" | "BAAI/bge-large-en-v1.5" => EmbeddingModel::BGELargeENV15,
            "all-MiniLM-L6-v2" | "all-minilm-l6-v2" => EmbeddingModel::AllMiniLML6V2,
            "nomic-embed-text-v1.5" | "nomic-embed-text" => EmbeddingModel::NomicEmbedTextV15,
            _ => {
                warn!("Unknown model '{}', falling back to bge-base-en-v1.5", name);
                EmbeddingModel::BGEBaseENV15
            }
        }
    }

    fn model_dimension(name: &str) -> usize {
        match name {
            name if name.contains("bge-small") => 384,
            name if name.contains("bge-large") => 1024,
            name if name.contains("MiniLM") || name.contains("minilm") => 384,
            _ => 768,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        EMBEDDING_REQUESTS.inc();
        let start = Instant::now();

        // fastembed is synchronous; keep it off the async worker threads.
        let model = self.model.clone();
        let texts = texts.to_vec();
        let batch_size = self.batch_size;

        let embeddings = tokio::task::spawn_blocking(move || {
            let mut embeddings = Vec::with_capacity(texts.len());
            for chunk in texts.chunks(batch_size) {
                let batch: Vec<&str> = chunk.iter().map(String::as_str).collect();
                let batch_embeddings = model
                    .embed(batch, None)
                    .context("Failed to generate embeddings")?;
                embeddings.extend(batch_embeddings);
            }
            Ok::<Vec<Vec<f32>>, anyhow::Error>(embeddings)
        })
        .await
        .context("Embedding task failed")??;

        EMBEDDING_LATENCY.observe(start.elapsed().as_secs_f64());

        Ok(embeddings)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No embedding generated for query"))
    }

    fn embedding_dimension(&self) -> usize {
        Self::model_dimension(&self.model_name)
    }

    fn provider_name(&self) -> &'static str {
        "fastembed"
    }
}
