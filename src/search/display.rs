//! Rendering of a ranked result list.
//!
//! Pure string building over a borrowed slice: the formatter never reorders
//! or mutates results, so callers can render the same list repeatedly.

use std::fmt::Write as _;

use super::profile::{BranchScore, RankedResult};

/// Characters of context kept before a snippet's first query match.
const SNIPPET_LEAD: usize = 40;
/// Characters of context kept after the match.
const SNIPPET_TRAIL: usize = 60;
/// Fallback snippet length when the query does not occur in the content.
const SNIPPET_FALLBACK: usize = 120;
/// Placements column is cut at this width.
const PLACEMENTS_WIDTH: usize = 80;

/// Render the ranked list with per-result detail and a closing summary.
pub fn render_results(results: &[RankedResult], query: &str) -> String {
    let mut out = String::new();

    if results.is_empty() {
        out.push_str("No results found. Try company names, roles, cities, or skills.\n");
        return out;
    }

    let _ = writeln!(out, "Found {} matches for \"{}\"\n", results.len(), query);

    for (position, result) in results.iter().enumerate() {
        let profile = &result.profile;

        let _ = writeln!(out, "{}. {}", position + 1, profile.name);
        let _ = writeln!(out, "   Location:  {}, {}", profile.city, profile.country);
        let _ = writeln!(
            out,
            "   Placements: {}",
            truncate_chars(&profile.placements, PLACEMENTS_WIDTH)
        );
        let _ = writeln!(
            out,
            "   Hybrid score: {:.4} ({})",
            result.hybrid_score,
            profile.score.origin()
        );
        match profile.score {
            BranchScore::Semantic(similarity) => {
                let _ = writeln!(out, "   Semantic similarity: {similarity:.4}");
            }
            BranchScore::Keyword(score) => {
                let _ = writeln!(out, "   Keyword score: {score:.1}");
            }
        }
        if result.exact_match {
            out.push_str("   Exact match\n");
        }
        let _ = writeln!(out, "   Id: {}", profile.id);
        let _ = writeln!(out, "   {}", snippet(&profile.content, query));
        out.push('\n');
    }

    let semantic_count = results
        .iter()
        .filter(|r| matches!(r.profile.score, BranchScore::Semantic(_)))
        .count();
    let keyword_count = results.len() - semantic_count;
    let avg_score: f32 =
        results.iter().map(|r| r.hybrid_score).sum::<f32>() / results.len() as f32;

    let _ = writeln!(
        out,
        "Summary: {semantic_count} semantic + {keyword_count} keyword results, avg score {avg_score:.4}"
    );

    out
}

/// A window of content centered on the first query match, or the head of
/// the content when the query does not occur.
pub fn snippet(content: &str, query: &str) -> String {
    let content_lower = content.to_lowercase();
    let query_lower = query.to_lowercase();

    // Lowercasing can change byte lengths for some scripts, which would
    // shift match offsets; only reuse them when the lengths agree.
    let match_start = if content_lower.len() == content.len() && !query_lower.is_empty() {
        content_lower.find(&query_lower)
    } else {
        None
    };

    match match_start {
        Some(start) => {
            let window_start = floor_char_boundary(content, start.saturating_sub(SNIPPET_LEAD));
            let window_end = ceil_char_boundary(
                content,
                (start + query_lower.len() + SNIPPET_TRAIL).min(content.len()),
            );

            let mut text = String::new();
            if window_start > 0 {
                text.push_str("...");
            }
            text.push_str(&content[window_start..window_end]);
            if window_end < content.len() {
                text.push_str("...");
            }
            text
        }
        None => {
            let head = truncate_chars(content, SNIPPET_FALLBACK);
            if head.len() < content.len() {
                format!("{head}...")
            } else {
                head
            }
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::profile::Profile;
    use std::collections::HashMap;

    fn ranked(id: &str, score: f32, content: &str) -> RankedResult {
        RankedResult {
            profile: Profile::from_record(
                id.to_string(),
                content.to_string(),
                HashMap::from([("name".to_string(), format!("Student {id}"))]),
                BranchScore::Keyword(score),
            ),
            hybrid_score: score,
            exact_match: false,
        }
    }

    #[test]
    fn test_render_preserves_input_order() {
        let results = vec![ranked("a", 0.2, "alpha"), ranked("b", 0.9, "beta")];
        let text = render_results(&results, "query");

        let first = text.find("1. Student a").unwrap();
        let second = text.find("2. Student b").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_render_empty_list() {
        let text = render_results(&[], "query");
        assert!(text.contains("No results found"));
    }

    #[test]
    fn test_render_summary_counts_origins() {
        let mut semantic = ranked("a", 0.8, "alpha");
        semantic.profile.score = BranchScore::Semantic(0.8);
        let results = vec![semantic, ranked("b", 0.4, "beta")];

        let text = render_results(&results, "query");
        assert!(text.contains("1 semantic + 1 keyword"));
    }

    #[test]
    fn test_snippet_centers_on_match() {
        let padding = "x".repeat(200);
        let content = format!("{padding} ciena optics work {padding}");
        let text = snippet(&content, "Ciena");

        assert!(text.contains("ciena optics"));
        assert!(text.starts_with("..."));
        assert!(text.ends_with("..."));
        assert!(text.len() < content.len());
    }

    #[test]
    fn test_snippet_without_match_takes_head() {
        let content = "z".repeat(300);
        let text = snippet(&content, "absent");
        assert_eq!(text.len(), 120 + 3);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn test_snippet_short_content_untouched() {
        assert_eq!(snippet("short bio", "absent"), "short bio");
    }

    #[test]
    fn test_snippet_multibyte_does_not_panic() {
        let content = "héllo wörld ".repeat(30);
        let text = snippet(&content, "wörld");
        assert!(!text.is_empty());

        // Fallback path with multibyte content
        let text = snippet(&content, "absent");
        assert!(!text.is_empty());
    }
}
