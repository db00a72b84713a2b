use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::enhance::QueryEnhancer;
use super::profile::{BranchScore, Profile};
use super::{resolve_collection, SearchError};
use crate::embeddings::EmbeddingProvider;
use crate::index::VectorIndex;

/// Semantic retrieval branch: embed the enhanced query and rank stored
/// profiles by vector similarity.
pub struct SemanticSearch {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    enhancer: QueryEnhancer,
}

/// Map a cosine distance to a similarity score.
///
/// Distance 0 maps to 1.0 and the value decreases monotonically; past
/// sqrt(2) it goes negative (distance 2 maps to -1.0) and is deliberately
/// not clamped. The quadratic form matches the convention the profile
/// collections were scored with at ingestion time, so it must not be
/// swapped for the linear `1 - d/2` — the two disagree on mid-range
/// distances and would reorder results.
pub fn similarity_from_distance(distance: f32) -> f32 {
    1.0 - (distance * distance) / 2.0
}

impl SemanticSearch {
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            index,
            embedder,
            enhancer: QueryEnhancer::default(),
        }
    }

    /// Replace the default synonym table.
    pub fn with_enhancer(mut self, enhancer: QueryEnhancer) -> Self {
        self.enhancer = enhancer;
        self
    }

    /// Retrieve up to `k` profiles from `collection`, most similar first.
    ///
    /// Failures (missing collection, embedder or index trouble, ragged
    /// response) surface as `Err`; the hybrid fuser degrades them to an
    /// empty branch rather than aborting the query.
    pub async fn search(
        &self,
        query: &str,
        collection: &str,
        k: usize,
    ) -> Result<Vec<Profile>, SearchError> {
        let start = Instant::now();

        let enhanced = self.enhancer.enhance(query);
        if enhanced != query {
            debug!(query = query, enhanced = %enhanced, "Query enhanced");
        }

        let vector = self
            .embedder
            .embed_query(&enhanced)
            .await
            .map_err(SearchError::ProviderUnavailable)?;

        let collection = resolve_collection(self.index.as_ref(), collection).await?;
        let response = self.index.query(&collection.id, &vector, k).await?;

        let profiles: Vec<Profile> = response
            .ids
            .into_iter()
            .zip(response.distances)
            .zip(response.documents)
            .zip(response.metadatas)
            .map(|(((id, distance), document), metadata)| {
                Profile::from_record(
                    id,
                    document,
                    metadata,
                    BranchScore::Semantic(similarity_from_distance(distance)),
                )
            })
            .collect();

        info!(
            search_type = "semantic",
            query = query,
            results = profiles.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Semantic search completed"
        );

        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::MockEmbedder;
    use crate::index::{MemoryIndex, MemoryRecord};
    use std::collections::HashMap;

    #[test]
    fn test_similarity_at_zero_distance() {
        assert!((similarity_from_distance(0.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_similarity_at_max_cosine_distance_goes_negative() {
        // 1 - 4/2 = -1.0: not clamped, a known quirk of the quadratic mapping.
        assert!((similarity_from_distance(2.0) - (-1.0)).abs() < f32::EPSILON);
    }

    #[test]
    fn test_similarity_mid_range() {
        assert!((similarity_from_distance(0.2) - 0.98).abs() < 1e-6);
        assert!((similarity_from_distance(1.0) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_similarity_monotonically_decreasing() {
        let mut previous = similarity_from_distance(0.0);
        for step in 1..=20 {
            let current = similarity_from_distance(step as f32 * 0.1);
            assert!(current < previous);
            previous = current;
        }
    }

    async fn searcher_over(records: Vec<MemoryRecord>) -> SemanticSearch {
        let index = Arc::new(MemoryIndex::new().with_collection("students", records));
        let embedder = Arc::new(MockEmbedder::new(32));
        SemanticSearch::new(index, embedder)
    }

    fn record_with_text(id: &str, text: &str, embedding: Vec<f32>) -> MemoryRecord {
        MemoryRecord {
            id: id.to_string(),
            document: text.to_string(),
            metadata: HashMap::from([("name".to_string(), format!("Student {id}"))]),
            embedding,
        }
    }

    #[tokio::test]
    async fn test_search_missing_collection_errors() {
        let searcher = searcher_over(vec![]).await;
        let err = searcher.search("google", "absent", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::CollectionNotFound(_)));
    }

    #[tokio::test]
    async fn test_search_returns_profiles_with_similarity() {
        // Embed the stored records with the same mock embedder the searcher
        // uses, for the enhanced form of the query; the matching record then
        // sits at distance ~0.
        let embedder = MockEmbedder::new(32);
        let enhanced = QueryEnhancer::default().enhance("ciena");
        let matching = embedder.embed_query(&enhanced).await.unwrap();
        let other = embedder.embed_query("something else").await.unwrap();

        let searcher = searcher_over(vec![
            record_with_text("hit", "networking placement", matching),
            record_with_text("miss", "unrelated", other),
        ])
        .await;

        let profiles = searcher.search("ciena", "students", 2).await.unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].id, "hit");
        match profiles[0].score {
            BranchScore::Semantic(similarity) => assert!(similarity > 0.99),
            BranchScore::Keyword(_) => panic!("semantic branch produced keyword score"),
        }
        assert_eq!(profiles[0].name, "Student hit");
    }
}
