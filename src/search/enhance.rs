//! Query expansion with a fixed synonym table.
//!
//! Short queries like "google" carry little signal for a sentence embedder,
//! so recruiter-domain synonyms are appended before embedding. Keyword
//! matching always runs on the raw query; only the semantic branch sees the
//! enhanced form.

/// Ordered synonym table applied to queries before embedding.
///
/// Entries are evaluated in table order against the accumulated string, and
/// expansions are appended, never substituted. An expansion may itself
/// contain a later key ("google" pulls in "software engineer"), in which
/// case that key fires too. The compounding is deliberate: chained
/// expansions widen the embedding neighborhood for brand-name queries.
pub struct QueryEnhancer {
    entries: Vec<(String, String)>,
}

impl QueryEnhancer {
    /// Build an enhancer from `(key, expansion)` pairs. Keys must be
    /// lowercase; they are matched against an already-lowercased query.
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// Expand `query`. Infallible; returns the lowercased query unchanged
    /// when no key matches.
    pub fn enhance(&self, query: &str) -> String {
        let mut enhanced = query.to_lowercase();

        for (key, expansion) in &self.entries {
            if enhanced.contains(key.as_str()) {
                enhanced.push(' ');
                enhanced.push_str(expansion);
            }
        }

        enhanced
    }
}

impl Default for QueryEnhancer {
    /// The frozen placement-domain table, in evaluation order.
    fn default() -> Self {
        let entries = [
            ("google", "Google tech company software engineer"),
            ("microsoft", "Microsoft tech software company"),
            ("amazon", "Amazon ecommerce tech company"),
            ("bangalore", "Bangalore Bengaluru city India"),
            ("data scientist", "data science machine learning AI"),
            ("product manager", "product management business strategy"),
            ("software engineer", "software development programming coding"),
            ("developer", "software development programming"),
            ("internship", "intern work experience training"),
            ("ciena", "Ciena networking telecommunications"),
        ];

        Self::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}
