//! Vector index boundary.
//!
//! The index is an external service holding named collections of embedded
//! records. Three operations are needed: listing collections, nearest-neighbor
//! query, and a bulk get used as the document snapshot for keyword scanning.
//! Responses use parallel arrays of equal length, the convention of the
//! Chroma-style HTTP API the production implementation talks to.

mod http;
mod memory;

pub use http::ChromaIndex;
pub use memory::{MemoryIndex, MemoryRecord};

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure modes of the index boundary.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The service could not be reached or answered with an error status.
    #[error("vector index unavailable: {0}")]
    Unavailable(anyhow::Error),

    /// The service answered, but the payload is missing expected arrays or
    /// its parallel arrays disagree in length.
    #[error("malformed index response: {0}")]
    Malformed(String),
}

/// A named collection in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// Nearest-neighbor query result: parallel arrays of equal length <= k.
#[derive(Debug, Clone, Default)]
pub struct QueryResponse {
    pub ids: Vec<String>,
    pub distances: Vec<f32>,
    pub documents: Vec<String>,
    pub metadatas: Vec<HashMap<String, String>>,
}

impl QueryResponse {
    /// Verify the parallel arrays agree in length.
    pub fn ensure_parallel(&self) -> Result<(), IndexError> {
        let n = self.ids.len();
        if self.distances.len() != n || self.documents.len() != n || self.metadatas.len() != n {
            return Err(IndexError::Malformed(format!(
                "query arrays disagree: {} ids, {} distances, {} documents, {} metadatas",
                n,
                self.distances.len(),
                self.documents.len(),
                self.metadatas.len()
            )));
        }
        Ok(())
    }
}

/// Bulk-get result: parallel arrays of equal length.
#[derive(Debug, Clone, Default)]
pub struct GetResponse {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<HashMap<String, String>>,
}

impl GetResponse {
    /// Verify the parallel arrays agree in length.
    pub fn ensure_parallel(&self) -> Result<(), IndexError> {
        let n = self.ids.len();
        if self.documents.len() != n || self.metadatas.len() != n {
            return Err(IndexError::Malformed(format!(
                "get arrays disagree: {} ids, {} documents, {} metadatas",
                n,
                self.documents.len(),
                self.metadatas.len()
            )));
        }
        Ok(())
    }
}

/// Read-only client interface to the vector index.
///
/// Implementations must hand back validated responses: parallel arrays of
/// equal length, with nulls already replaced by empty values.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// List every collection the index knows about.
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, IndexError>;

    /// Return up to `k` nearest stored vectors for `vector`, with distances,
    /// documents, and metadata.
    async fn query(
        &self,
        collection_id: &str,
        vector: &[f32],
        k: usize,
    ) -> Result<QueryResponse, IndexError>;

    /// Return up to `limit` stored records for exhaustive scanning.
    async fn get_all(&self, collection_id: &str, limit: usize) -> Result<GetResponse, IndexError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_response_parallel_ok() {
        let response = QueryResponse {
            ids: vec!["a".into()],
            distances: vec![0.1],
            documents: vec!["doc".into()],
            metadatas: vec![HashMap::new()],
        };
        assert!(response.ensure_parallel().is_ok());
    }

    #[test]
    fn test_query_response_ragged_is_malformed() {
        let response = QueryResponse {
            ids: vec!["a".into(), "b".into()],
            distances: vec![0.1],
            documents: vec!["doc".into(), "doc".into()],
            metadatas: vec![HashMap::new(), HashMap::new()],
        };
        assert!(matches!(
            response.ensure_parallel(),
            Err(IndexError::Malformed(_))
        ));
    }

    #[test]
    fn test_get_response_ragged_is_malformed() {
        let response = GetResponse {
            ids: vec!["a".into()],
            documents: vec![],
            metadatas: vec![HashMap::new()],
        };
        assert!(matches!(
            response.ensure_parallel(),
            Err(IndexError::Malformed(_))
        ));
    }
}
