use std::collections::HashMap;

use serde::Serialize;

/// Sentinel for a missing display name.
pub const UNKNOWN_NAME: &str = "Unknown";
/// Sentinel for missing location/placement metadata.
pub const NOT_AVAILABLE: &str = "N/A";

/// Raw score from the branch that surfaced a profile.
///
/// The variant doubles as the origin tag: a profile discovered by both
/// branches keeps its semantic score and the keyword one is dropped during
/// fusion, so a single profile never carries both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "origin", content = "score", rename_all = "lowercase")]
pub enum BranchScore {
    /// Similarity derived from vector distance, in [0, 1] for distances
    /// up to sqrt(2) and negative beyond that.
    Semantic(f32),
    /// Additive substring-match score, non-negative and unbounded above.
    Keyword(f32),
}

impl BranchScore {
    /// The branch label, as shown in output and tracing events.
    pub fn origin(&self) -> &'static str {
        match self {
            Self::Semantic(_) => "semantic",
            Self::Keyword(_) => "keyword",
        }
    }

    /// The raw branch score, whichever variant applies.
    pub fn value(&self) -> f32 {
        match self {
            Self::Semantic(v) | Self::Keyword(v) => *v,
        }
    }
}

/// A candidate student record surfaced by one retrieval branch.
///
/// `id` is unique per underlying record and is the deduplication key during
/// fusion. Display fields fall back to fixed sentinels when the stored
/// metadata lacks them; scoring always consults the raw `metadata` map so the
/// sentinels never earn match bonuses for absent fields.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub placements: String,
    pub content: String,
    pub metadata: HashMap<String, String>,
    pub score: BranchScore,
}

impl Profile {
    /// Build a profile from a stored record, applying the display sentinels
    /// for missing metadata fields.
    pub fn from_record(
        id: String,
        document: String,
        metadata: HashMap<String, String>,
        score: BranchScore,
    ) -> Self {
        let field = |key: &str, fallback: &str| {
            metadata
                .get(key)
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        };

        Self {
            name: field("name", UNKNOWN_NAME),
            city: field("city", NOT_AVAILABLE),
            country: field("country", NOT_AVAILABLE),
            placements: field("placements", NOT_AVAILABLE),
            id,
            content: document,
            metadata,
            score,
        }
    }
}

/// A profile with its fused score, ready for presentation.
///
/// Created fresh per query and immutable afterwards; the formatter only
/// reads it.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub profile: Profile,
    /// The fused ranking key. Not bounded to [0, 1].
    pub hybrid_score: f32,
    /// Whether the raw query appears verbatim (case-insensitive) in the
    /// content or the placements metadata.
    pub exact_match: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_record_populates_fields() {
        let profile = Profile::from_record(
            "s-1".to_string(),
            "worked at Ciena".to_string(),
            meta(&[
                ("name", "Asha Rao"),
                ("city", "Delhi"),
                ("country", "India"),
                ("placements", "Ciena"),
            ]),
            BranchScore::Semantic(0.9),
        );

        assert_eq!(profile.name, "Asha Rao");
        assert_eq!(profile.city, "Delhi");
        assert_eq!(profile.country, "India");
        assert_eq!(profile.placements, "Ciena");
        assert_eq!(profile.score.origin(), "semantic");
    }

    #[test]
    fn test_from_record_missing_metadata_uses_sentinels() {
        let profile = Profile::from_record(
            "s-2".to_string(),
            String::new(),
            HashMap::new(),
            BranchScore::Keyword(4.0),
        );

        assert_eq!(profile.name, UNKNOWN_NAME);
        assert_eq!(profile.city, NOT_AVAILABLE);
        assert_eq!(profile.country, NOT_AVAILABLE);
        assert_eq!(profile.placements, NOT_AVAILABLE);
        assert!(profile.metadata.is_empty());
    }

    #[test]
    fn test_branch_score_value() {
        assert!((BranchScore::Semantic(0.98).value() - 0.98).abs() < f32::EPSILON);
        assert!((BranchScore::Keyword(6.0).value() - 6.0).abs() < f32::EPSILON);
        assert_eq!(BranchScore::Keyword(6.0).origin(), "keyword");
    }
}
