use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use super::profile::{BranchScore, Profile};
use super::{resolve_collection, SearchError};
use crate::index::VectorIndex;

/// How many records the snapshot fetch is bounded at. The scan is
/// exhaustive over the snapshot, so it cannot scale past this; collections
/// larger than the cap lose tail records from keyword matching. Accepted
/// limitation.
pub const SNAPSHOT_LIMIT: usize = 1000;

const CONTENT_WEIGHT: f32 = 2.0;
const OCCURRENCE_WEIGHT: f32 = 0.5;
const OCCURRENCE_CAP: f32 = 2.0;
const PLACEMENTS_WEIGHT: f32 = 3.0;
const NAME_WEIGHT: f32 = 4.0;

/// Keyword retrieval branch: case-insensitive substring scan over the full
/// document snapshot.
pub struct KeywordSearch {
    index: Arc<dyn VectorIndex>,
    snapshot_limit: usize,
}

/// Additive match score for one record against the raw query.
///
/// `name` and `placements` come straight from the stored metadata; absent
/// fields must be passed as `None`/empty so display sentinels never match.
/// The repeat-occurrence bonus counts non-overlapping matches and is capped
/// so token-stuffed records cannot run away.
pub fn keyword_score(
    query_lower: &str,
    content: &str,
    name: Option<&str>,
    placements: &str,
) -> f32 {
    let content_lower = content.to_lowercase();
    let placements_lower = placements.to_lowercase();

    let mut score = 0.0;

    if content_lower.contains(query_lower) {
        score += CONTENT_WEIGHT;
        let occurrences = content_lower.matches(query_lower).count();
        score += (occurrences as f32 * OCCURRENCE_WEIGHT).min(OCCURRENCE_CAP);
    }

    if placements_lower.contains(query_lower) {
        score += PLACEMENTS_WEIGHT;
    }

    if let Some(name) = name {
        if name.to_lowercase().contains(query_lower) {
            score += NAME_WEIGHT;
        }
    }

    score
}

impl KeywordSearch {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self {
            index,
            snapshot_limit: SNAPSHOT_LIMIT,
        }
    }

    /// Override the snapshot fetch bound.
    pub fn with_snapshot_limit(mut self, limit: usize) -> Self {
        self.snapshot_limit = limit;
        self
    }

    /// Scan `collection` and return up to `k` matching profiles, highest
    /// keyword score first. Records that match nothing are discarded.
    pub async fn search(
        &self,
        query: &str,
        collection: &str,
        k: usize,
    ) -> Result<Vec<Profile>, SearchError> {
        let start = Instant::now();
        let query_lower = query.to_lowercase();

        let collection = resolve_collection(self.index.as_ref(), collection).await?;
        let snapshot = self
            .index
            .get_all(&collection.id, self.snapshot_limit)
            .await?;

        let mut matches: Vec<Profile> = snapshot
            .ids
            .into_iter()
            .zip(snapshot.documents)
            .zip(snapshot.metadatas)
            .filter_map(|((id, document), metadata)| {
                let score = keyword_score(
                    &query_lower,
                    &document,
                    metadata.get("name").map(String::as_str),
                    metadata.get("placements").map(String::as_str).unwrap_or(""),
                );
                if score > 0.0 {
                    Some(Profile::from_record(
                        id,
                        document,
                        metadata,
                        BranchScore::Keyword(score),
                    ))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .value()
                .partial_cmp(&a.score.value())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(k);

        info!(
            search_type = "keyword",
            query = query,
            results = matches.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Keyword search completed"
        );

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{MemoryIndex, MemoryRecord};
    use std::collections::HashMap;

    #[test]
    fn test_name_only_match_scores_four() {
        let score = keyword_score("asha rao", "no mention here", Some("Asha Rao"), "");
        assert!((score - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_content_triple_occurrence_scores_three_and_a_half() {
        // 2.0 base + min(3 * 0.5, 2.0) = 3.5
        let score = keyword_score("x", "x then x then x", None, "");
        assert!((score - 3.5).abs() < 1e-6);
    }

    #[test]
    fn test_occurrence_bonus_caps_at_two() {
        let content = "go ".repeat(50);
        let score = keyword_score("go", &content, None, "");
        assert!((score - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_placements_match_scores_three() {
        let score = keyword_score("ciena", "other text", None, "Ciena, Nokia");
        assert!((score - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_all_signals_accumulate() {
        // content hit (2.0 + 0.5) + placements (3.0) + name (4.0)
        let score = keyword_score(
            "google",
            "interned at Google",
            Some("Google Fan"),
            "Google",
        );
        assert!((score - 9.5).abs() < 1e-6);
    }

    #[test]
    fn test_missing_name_never_matches() {
        let score = keyword_score("unknown", "nothing relevant", None, "");
        assert!(score.abs() < f32::EPSILON);
    }

    fn record(id: &str, content: &str, name: &str, placements: &str) -> MemoryRecord {
        MemoryRecord {
            id: id.to_string(),
            document: content.to_string(),
            metadata: HashMap::from([
                ("name".to_string(), name.to_string()),
                ("placements".to_string(), placements.to_string()),
            ]),
            embedding: vec![1.0],
        }
    }

    #[tokio::test]
    async fn test_search_sorts_and_truncates() {
        let index = Arc::new(MemoryIndex::new().with_collection(
            "students",
            vec![
                record("weak", "google once", "A", ""),
                record("strong", "google google google", "Google Person", "Google"),
                record("none", "unrelated", "B", ""),
                record("mid", "google", "C", "Google"),
            ],
        ));
        let searcher = KeywordSearch::new(index);

        let results = searcher.search("Google", "students", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "strong");
        assert_eq!(results[1].id, "mid");
        assert!(results[0].score.value() >= results[1].score.value());
    }

    #[tokio::test]
    async fn test_search_discards_zero_scores() {
        let index = Arc::new(
            MemoryIndex::new()
                .with_collection("students", vec![record("none", "unrelated", "B", "")]),
        );
        let searcher = KeywordSearch::new(index);

        let results = searcher.search("google", "students", 10).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_missing_collection_errors() {
        let searcher = KeywordSearch::new(Arc::new(MemoryIndex::new()));
        let err = searcher.search("google", "absent", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::CollectionNotFound(_)));
    }

    #[tokio::test]
    async fn test_snapshot_limit_bounds_the_scan() {
        let records: Vec<MemoryRecord> = (0..20)
            .map(|i| record(&format!("s{i}"), "google", "X", ""))
            .collect();
        let index = Arc::new(MemoryIndex::new().with_collection("students", records));
        let searcher = KeywordSearch::new(index).with_snapshot_limit(5);

        let results = searcher.search("google", "students", 50).await.unwrap();
        assert_eq!(results.len(), 5);
    }
}
