//! Hybrid retrieval over student profiles.
//!
//! This module contains:
//! - `enhance` - query expansion with a fixed synonym table
//! - `semantic` - embedding-based nearest-neighbor branch
//! - `keyword` - substring scan over the document snapshot
//! - `hybrid` - concurrent branch execution, deduplication, and score fusion
//! - `profile` - the candidate/result data model
//! - `display` - read-only rendering of a ranked result list

pub mod display;
pub mod enhance;
pub mod hybrid;
pub mod keyword;
pub mod profile;
pub mod semantic;

pub use enhance::QueryEnhancer;
pub use hybrid::HybridSearch;
pub use keyword::KeywordSearch;
pub use profile::{BranchScore, Profile, RankedResult};
pub use semantic::SemanticSearch;

use thiserror::Error;

use crate::index::{CollectionInfo, IndexError, VectorIndex};

/// Failure taxonomy of one retrieval branch.
///
/// Branch errors are not fatal to a hybrid query: the fuser logs them and
/// substitutes an empty result list. Only `CollectionNotFound` from both
/// branches propagates to the caller.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("collection \"{0}\" not found in the vector index")]
    CollectionNotFound(String),

    #[error("provider unavailable: {0}")]
    ProviderUnavailable(anyhow::Error),

    #[error("malformed index response: {0}")]
    MalformedResponse(String),
}

impl From<IndexError> for SearchError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Unavailable(e) => Self::ProviderUnavailable(e),
            IndexError::Malformed(msg) => Self::MalformedResponse(msg),
        }
    }
}

/// Resolve a collection name to its index-side descriptor.
pub(crate) async fn resolve_collection(
    index: &dyn VectorIndex,
    name: &str,
) -> Result<CollectionInfo, SearchError> {
    let collections = index.list_collections().await?;
    collections
        .into_iter()
        .find(|c| c.name == name)
        .ok_or_else(|| SearchError::CollectionNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;

    #[tokio::test]
    async fn test_resolve_collection_by_name() {
        let index = MemoryIndex::new().with_collection("students", vec![]);
        let info = resolve_collection(&index, "students").await.unwrap();
        assert_eq!(info.name, "students");
    }

    #[tokio::test]
    async fn test_resolve_missing_collection() {
        let index = MemoryIndex::new();
        let err = resolve_collection(&index, "absent").await.unwrap_err();
        assert!(matches!(err, SearchError::CollectionNotFound(name) if name == "absent"));
    }
}
