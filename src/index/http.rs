use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{CollectionInfo, GetResponse, IndexError, QueryResponse, VectorIndex};
use crate::config::IndexConfig;

/// HTTP client for a Chroma-style vector index.
///
/// Collections live under a tenant/database pair; queries and bulk gets are
/// POSTs against the collection id. No retry or timeout policy is applied
/// here; re-invocation is the caller's responsibility.
pub struct ChromaIndex {
    client: Client,
    base_url: String,
}

impl ChromaIndex {
    pub fn new(config: &IndexConfig) -> Self {
        let base_url = format!(
            "{}/api/v2/tenants/{}/databases/{}",
            config.url.trim_end_matches('/'),
            config.tenant,
            config.database
        );

        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn collections_url(&self) -> String {
        format!("{}/collections", self.base_url)
    }
}

/// Raw nearest-neighbor payload: one inner array per query embedding.
/// A single embedding is sent, so only the first row is meaningful.
#[derive(Debug, Deserialize)]
struct RawQueryResponse {
    ids: Option<Vec<Vec<String>>>,
    distances: Option<Vec<Vec<f32>>>,
    documents: Option<Vec<Vec<Option<String>>>>,
    metadatas: Option<Vec<Vec<Option<HashMap<String, serde_json::Value>>>>>,
}

#[derive(Debug, Deserialize)]
struct RawGetResponse {
    ids: Option<Vec<String>>,
    documents: Option<Vec<Option<String>>>,
    metadatas: Option<Vec<Option<HashMap<String, serde_json::Value>>>>,
}

fn first_row<T>(rows: Option<Vec<Vec<T>>>, field: &str) -> Result<Vec<T>, IndexError> {
    rows.and_then(|mut rows| {
        if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        }
    })
    .ok_or_else(|| IndexError::Malformed(format!("response is missing the {field} array")))
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, IndexError> {
    value.ok_or_else(|| IndexError::Malformed(format!("response is missing the {field} array")))
}

/// Stored metadata values may be any JSON scalar; everything is carried as a
/// string for substring matching downstream.
fn stringify_metadata(raw: Option<HashMap<String, serde_json::Value>>) -> HashMap<String, String> {
    raw.unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect()
}

#[async_trait]
impl VectorIndex for ChromaIndex {
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, IndexError> {
        let url = self.collections_url();
        debug!(url = %url, "Listing collections");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("GET {url}"))
            .map_err(IndexError::Unavailable)?;

        response
            .json::<Vec<CollectionInfo>>()
            .await
            .map_err(|e| IndexError::Malformed(e.to_string()))
    }

    async fn query(
        &self,
        collection_id: &str,
        vector: &[f32],
        k: usize,
    ) -> Result<QueryResponse, IndexError> {
        let url = format!("{}/{}/query", self.collections_url(), collection_id);
        let payload = json!({
            "query_embeddings": [vector],
            "n_results": k,
            "include": ["metadatas", "documents", "distances"],
        });

        let raw: RawQueryResponse = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("POST {url}"))
            .map_err(IndexError::Unavailable)?
            .json()
            .await
            .map_err(|e| IndexError::Malformed(e.to_string()))?;

        let response = QueryResponse {
            ids: first_row(raw.ids, "ids")?,
            distances: first_row(raw.distances, "distances")?,
            documents: first_row(raw.documents, "documents")?
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect(),
            metadatas: first_row(raw.metadatas, "metadatas")?
                .into_iter()
                .map(stringify_metadata)
                .collect(),
        };
        response.ensure_parallel()?;

        Ok(response)
    }

    async fn get_all(&self, collection_id: &str, limit: usize) -> Result<GetResponse, IndexError> {
        let url = format!("{}/{}/get", self.collections_url(), collection_id);
        let payload = json!({
            "include": ["metadatas", "documents"],
            "limit": limit,
        });

        let raw: RawGetResponse = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("POST {url}"))
            .map_err(IndexError::Unavailable)?
            .json()
            .await
            .map_err(|e| IndexError::Malformed(e.to_string()))?;

        let response = GetResponse {
            ids: required(raw.ids, "ids")?,
            documents: required(raw.documents, "documents")?
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect(),
            metadatas: required(raw.metadatas, "metadatas")?
                .into_iter()
                .map(stringify_metadata)
                .collect(),
        };
        response.ensure_parallel()?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;

    #[test]
    fn test_base_url_normalization() {
        let config = IndexConfig {
            url: "http://localhost:8000/".to_string(),
            ..IndexConfig::default()
        };
        let index = ChromaIndex::new(&config);
        assert_eq!(
            index.collections_url(),
            "http://localhost:8000/api/v2/tenants/default_tenant/databases/default_database/collections"
        );
    }

    #[test]
    fn test_first_row_missing_is_malformed() {
        let result: Result<Vec<String>, _> = first_row(None, "ids");
        assert!(matches!(result, Err(IndexError::Malformed(_))));

        let result: Result<Vec<String>, _> = first_row(Some(vec![]), "ids");
        assert!(matches!(result, Err(IndexError::Malformed(_))));
    }

    #[test]
    fn test_stringify_metadata_keeps_strings_and_renders_scalars() {
        let mut raw = HashMap::new();
        raw.insert("name".to_string(), serde_json::json!("Asha"));
        raw.insert("batch".to_string(), serde_json::json!(2024));

        let converted = stringify_metadata(Some(raw));
        assert_eq!(converted.get("name").unwrap(), "Asha");
        assert_eq!(converted.get("batch").unwrap(), "2024");
    }

    #[test]
    fn test_stringify_metadata_none_is_empty() {
        assert!(stringify_metadata(None).is_empty());
    }
}
