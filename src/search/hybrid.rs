//! Hybrid search combining the semantic and keyword branches.
//!
//! Both branches run concurrently over-fetched at twice the requested
//! limit, results are deduplicated by profile id with the semantic branch
//! winning conflicts, and every survivor gets a fused score mixing its
//! branch-normalized score with exact-match bonuses.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use super::enhance::QueryEnhancer;
use super::keyword::KeywordSearch;
use super::profile::{BranchScore, Profile, RankedResult};
use super::semantic::SemanticSearch;
use super::SearchError;
use crate::embeddings::EmbeddingProvider;
use crate::index::VectorIndex;
use crate::metrics::{SEARCH_LATENCY, SEARCH_REQUESTS, SEARCH_RESULTS};

/// Weight of the similarity score for semantic-origin results.
const SEMANTIC_WEIGHT: f32 = 0.6;
/// Weight of the normalized keyword score for keyword-origin results.
const KEYWORD_WEIGHT: f32 = 0.7;
/// Keyword scores are squashed into [0, 1] by this divisor before weighting.
const KEYWORD_NORM: f32 = 10.0;
/// Bonus when the raw query appears in the content of a semantic result.
const CONTENT_BONUS: f32 = 0.3;
/// Bonus when the raw query appears in the placements metadata.
const PLACEMENTS_BONUS: f32 = 0.4;
/// Bonus when the raw query appears in the stored name.
const NAME_BONUS: f32 = 0.5;
/// Per-token content bonus for keyword-origin results.
const TOKEN_BONUS: f32 = 0.1;
/// Cap on the accumulated per-token bonus.
const TOKEN_BONUS_CAP: f32 = 0.3;
/// Each branch fetches this multiple of the requested limit, leaving room
/// for deduplication and re-ranking losses.
const OVERFETCH_FACTOR: usize = 2;

/// Fused retrieval over both branches.
pub struct HybridSearch {
    semantic: SemanticSearch,
    keyword: KeywordSearch,
}

impl HybridSearch {
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            semantic: SemanticSearch::new(index.clone(), embedder),
            keyword: KeywordSearch::new(index),
        }
    }

    /// Replace the semantic branch's synonym table.
    pub fn with_enhancer(mut self, enhancer: QueryEnhancer) -> Self {
        self.semantic = self.semantic.with_enhancer(enhancer);
        self
    }

    /// Override the keyword branch's snapshot fetch bound.
    pub fn with_snapshot_limit(mut self, limit: usize) -> Self {
        self.keyword = self.keyword.with_snapshot_limit(limit);
        self
    }

    /// Run both branches and fuse their results into a single ranking of at
    /// most `limit` entries.
    ///
    /// A failing branch degrades to an empty result list; the query only
    /// errors when both branches report the collection missing, which means
    /// there is nothing to degrade to.
    pub async fn search(
        &self,
        query: &str,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<RankedResult>, SearchError> {
        SEARCH_REQUESTS.inc();
        let start = Instant::now();
        let fetch_limit = limit * OVERFETCH_FACTOR;

        let (semantic, keyword) = tokio::join!(
            self.semantic.search(query, collection, fetch_limit),
            self.keyword.search(query, collection, fetch_limit)
        );

        if let (Err(SearchError::CollectionNotFound(name)), Err(SearchError::CollectionNotFound(_))) =
            (&semantic, &keyword)
        {
            return Err(SearchError::CollectionNotFound(name.clone()));
        }

        let semantic = flatten_branch("semantic", semantic);
        let keyword = flatten_branch("keyword", keyword);

        let results = fuse(semantic, keyword, query, limit);

        let elapsed = start.elapsed();
        SEARCH_LATENCY.observe(elapsed.as_secs_f64());
        SEARCH_RESULTS.observe(results.len() as f64);

        info!(
            search_type = "hybrid",
            query = query,
            results = results.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Hybrid search completed"
        );

        Ok(results)
    }
}

/// Degrade a failed branch to an empty result list.
fn flatten_branch(branch: &str, result: Result<Vec<Profile>, SearchError>) -> Vec<Profile> {
    match result {
        Ok(profiles) => profiles,
        Err(err) => {
            warn!(branch = branch, error = %err, "Branch failed, continuing without it");
            Vec::new()
        }
    }
}

/// Deduplicate, score, sort, and truncate.
///
/// Semantic results are inserted first, so a profile found by both branches
/// keeps its semantic scoring fields and the keyword occurrence is dropped.
/// The sort is stable: ties keep insertion order.
pub fn fuse(
    semantic: Vec<Profile>,
    keyword: Vec<Profile>,
    query: &str,
    limit: usize,
) -> Vec<RankedResult> {
    let query_lower = query.to_lowercase();

    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates: Vec<Profile> = Vec::with_capacity(semantic.len() + keyword.len());

    for profile in semantic.into_iter().chain(keyword) {
        if seen.insert(profile.id.clone()) {
            candidates.push(profile);
        }
    }

    let mut results: Vec<RankedResult> = candidates
        .into_iter()
        .map(|profile| {
            let hybrid_score = hybrid_score(&profile, &query_lower);
            let exact_match = is_exact_match(&profile, &query_lower);
            RankedResult {
                profile,
                hybrid_score,
                exact_match,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.hybrid_score
            .partial_cmp(&a.hybrid_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(limit);

    results
}

/// Fused ranking key for one candidate. Not bounded to [0, 1]: the
/// exact-match bonuses can push semantic results past it.
fn hybrid_score(profile: &Profile, query_lower: &str) -> f32 {
    let content_lower = profile.content.to_lowercase();
    let placements_lower = profile
        .metadata
        .get("placements")
        .map(|p| p.to_lowercase())
        .unwrap_or_default();

    match profile.score {
        BranchScore::Semantic(similarity) => {
            let mut score = similarity * SEMANTIC_WEIGHT;

            if content_lower.contains(query_lower) {
                score += CONTENT_BONUS;
            }
            if placements_lower.contains(query_lower) {
                score += PLACEMENTS_BONUS;
            }
            if profile
                .metadata
                .get("name")
                .is_some_and(|n| n.to_lowercase().contains(query_lower))
            {
                score += NAME_BONUS;
            }

            score
        }
        BranchScore::Keyword(raw) => {
            let mut score = (raw / KEYWORD_NORM).min(1.0) * KEYWORD_WEIGHT;

            let mut token_bonus = 0.0;
            for token in query_lower.split_whitespace() {
                if token.len() > 2 && content_lower.contains(token) {
                    token_bonus += TOKEN_BONUS;
                }
            }
            score += token_bonus.min(TOKEN_BONUS_CAP);

            score
        }
    }
}

/// The query appears verbatim in content or placements. Name hits do not
/// count as exact matches; they only contribute score bonuses.
fn is_exact_match(profile: &Profile, query_lower: &str) -> bool {
    if profile.content.to_lowercase().contains(query_lower) {
        return true;
    }
    profile
        .metadata
        .get("placements")
        .is_some_and(|p| p.to_lowercase().contains(query_lower))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn semantic_profile(id: &str, similarity: f32, content: &str) -> Profile {
        Profile::from_record(
            id.to_string(),
            content.to_string(),
            HashMap::new(),
            BranchScore::Semantic(similarity),
        )
    }

    fn keyword_profile(id: &str, score: f32, content: &str) -> Profile {
        Profile::from_record(
            id.to_string(),
            content.to_string(),
            HashMap::new(),
            BranchScore::Keyword(score),
        )
    }

    fn with_metadata(mut profile: Profile, pairs: &[(&str, &str)]) -> Profile {
        for (k, v) in pairs {
            profile.metadata.insert(k.to_string(), v.to_string());
        }
        profile
    }

    #[test]
    fn test_semantic_score_with_content_bonus() {
        // 0.6 * 0.98 + 0.3 = 0.888
        let profile = semantic_profile("a", 0.98, "works at Ciena on optics");
        let score = hybrid_score(&profile, "ciena");
        assert!((score - 0.888).abs() < 1e-5);
    }

    #[test]
    fn test_semantic_score_all_bonuses() {
        let profile = with_metadata(
            semantic_profile("a", 1.0, "Google intern"),
            &[("placements", "Google"), ("name", "Google Fan")],
        );
        // 0.6 + 0.3 + 0.4 + 0.5
        let score = hybrid_score(&profile, "google");
        assert!((score - 1.8).abs() < 1e-5);
    }

    #[test]
    fn test_keyword_score_normalization_and_token_bonus() {
        // 0.7 * min(6/10, 1) + one token hit = 0.42 + 0.1
        let profile = keyword_profile("b", 6.0, "placed at ciena recently");
        let score = hybrid_score(&profile, "ciena");
        assert!((score - 0.52).abs() < 1e-5);
    }

    #[test]
    fn test_keyword_norm_saturates_above_ten() {
        let profile = keyword_profile("b", 25.0, "nothing matching");
        let score = hybrid_score(&profile, "xyz");
        assert!((score - 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_token_bonus_caps_at_three_tokens() {
        let profile = keyword_profile("b", 0.0, "alpha beta gamma delta");
        let score = hybrid_score(&profile, "alpha beta gamma delta");
        assert!((score - TOKEN_BONUS_CAP).abs() < 1e-5);
    }

    #[test]
    fn test_short_tokens_earn_no_bonus() {
        let profile = keyword_profile("b", 0.0, "go to it");
        let score = hybrid_score(&profile, "go to it");
        assert!(score.abs() < 1e-6);
    }

    #[test]
    fn test_fuse_dedup_keeps_semantic_occurrence() {
        let semantic = vec![semantic_profile("dup", 0.9, "common doc")];
        let keyword = vec![
            keyword_profile("dup", 8.0, "common doc"),
            keyword_profile("solo", 4.0, "other doc"),
        ];

        let results = fuse(semantic, keyword, "query", 10);
        assert_eq!(results.len(), 2);

        let dup = results.iter().find(|r| r.profile.id == "dup").unwrap();
        assert_eq!(dup.profile.score.origin(), "semantic");
    }

    #[test]
    fn test_fuse_sorts_descending_and_truncates() {
        let keyword = vec![
            keyword_profile("low", 1.0, ""),
            keyword_profile("high", 9.0, ""),
            keyword_profile("mid", 5.0, ""),
        ];

        let results = fuse(Vec::new(), keyword, "zzz", 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].profile.id, "high");
        assert_eq!(results[1].profile.id, "mid");
        assert!(results[0].hybrid_score >= results[1].hybrid_score);
    }

    #[test]
    fn test_fuse_ties_keep_insertion_order() {
        let keyword = vec![
            keyword_profile("first", 3.0, ""),
            keyword_profile("second", 3.0, ""),
        ];

        let results = fuse(Vec::new(), keyword, "zzz", 10);
        assert_eq!(results[0].profile.id, "first");
        assert_eq!(results[1].profile.id, "second");
    }

    #[test]
    fn test_fuse_empty_branches_empty_result() {
        let results = fuse(Vec::new(), Vec::new(), "anything", 10);
        assert!(results.is_empty());
    }

    #[test]
    fn test_exact_match_via_content_or_placements_not_name() {
        let by_content = keyword_profile("a", 2.0, "interned at Ciena");
        let by_placements = with_metadata(
            keyword_profile("b", 3.0, "other"),
            &[("placements", "Ciena, Nokia")],
        );
        let by_name_only = with_metadata(
            keyword_profile("c", 4.0, "other"),
            &[("name", "Ciena Kapoor")],
        );

        let results = fuse(
            Vec::new(),
            vec![by_content, by_placements, by_name_only],
            "ciena",
            10,
        );

        let flag = |id: &str| results.iter().find(|r| r.profile.id == id).unwrap().exact_match;
        assert!(flag("a"));
        assert!(flag("b"));
        assert!(!flag("c"));
    }
}
