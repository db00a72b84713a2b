use std::collections::HashMap;

use async_trait::async_trait;

use super::{CollectionInfo, GetResponse, IndexError, QueryResponse, VectorIndex};

/// One stored record of an in-memory collection.
#[derive(Debug, Clone)]
pub struct MemoryRecord {
    pub id: String,
    pub document: String,
    pub metadata: HashMap<String, String>,
    pub embedding: Vec<f32>,
}

struct MemoryCollection {
    id: String,
    name: String,
    records: Vec<MemoryRecord>,
}

/// In-memory vector index speaking cosine distance.
///
/// Build it up front, then share behind an `Arc`; the trait surface is
/// read-only so no locking is needed. Used by the integration tests and
/// handy for offline experiments.
#[derive(Default)]
pub struct MemoryIndex {
    collections: Vec<MemoryCollection>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection with its records. The collection id is derived from
    /// the name, mirroring how the HTTP index resolves names to ids.
    pub fn with_collection(mut self, name: &str, records: Vec<MemoryRecord>) -> Self {
        let id = format!("mem-{}", self.collections.len());
        self.collections.push(MemoryCollection {
            id,
            name: name.to_string(),
            records,
        });
        self
    }

    fn collection(&self, collection_id: &str) -> Result<&MemoryCollection, IndexError> {
        self.collections
            .iter()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| {
                IndexError::Unavailable(anyhow::anyhow!(
                    "unknown collection id: {collection_id}"
                ))
            })
    }
}

/// Cosine distance in [0, 2]. Zero-magnitude vectors are treated as
/// orthogonal rather than dividing by zero.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, IndexError> {
        Ok(self
            .collections
            .iter()
            .map(|c| CollectionInfo {
                id: c.id.clone(),
                name: c.name.clone(),
                metadata: None,
            })
            .collect())
    }

    async fn query(
        &self,
        collection_id: &str,
        vector: &[f32],
        k: usize,
    ) -> Result<QueryResponse, IndexError> {
        let collection = self.collection(collection_id)?;

        let mut scored: Vec<(&MemoryRecord, f32)> = collection
            .records
            .iter()
            .map(|r| (r, cosine_distance(&r.embedding, vector)))
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        let mut response = QueryResponse::default();
        for (record, distance) in scored {
            response.ids.push(record.id.clone());
            response.distances.push(distance);
            response.documents.push(record.document.clone());
            response.metadatas.push(record.metadata.clone());
        }
        Ok(response)
    }

    async fn get_all(&self, collection_id: &str, limit: usize) -> Result<GetResponse, IndexError> {
        let collection = self.collection(collection_id)?;

        let mut response = GetResponse::default();
        for record in collection.records.iter().take(limit) {
            response.ids.push(record.id.clone());
            response.documents.push(record.document.clone());
            response.metadatas.push(record.metadata.clone());
        }
        Ok(response)
    }
}
