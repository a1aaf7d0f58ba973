//! Pinecone vector index client over the REST data plane.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taxaumate_core::{MatchCandidate, SourceType};
use tracing::{debug, info};

use crate::{StoreError, VectorIndex};

const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2024-07";

/// One Pinecone index, queried for ids only (no metadata, no values).
pub struct PineconeIndex {
    client: reqwest::Client,
    api_key: String,
    name: String,
    host: String,
    source_type: SourceType,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ScoredId>,
}

#[derive(Deserialize)]
struct ScoredId {
    id: String,
    #[serde(default)]
    score: f32,
}

#[derive(Deserialize)]
struct IndexDescription {
    host: String,
}

impl PineconeIndex {
    /// Resolve the index's data-plane host through the control plane.
    ///
    /// Fails if the API key is rejected or the index does not exist, which
    /// makes this the startup connectivity check for the index.
    pub async fn connect(
        api_key: &str,
        index_name: &str,
        source_type: SourceType,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::new();
        let url = format!("{CONTROL_PLANE_URL}/indexes/{index_name}");

        info!(index = %index_name, "describing pinecone index");
        let resp = client
            .get(&url)
            .header("Api-Key", api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::IndexNotFound(index_name.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let desc: IndexDescription = resp.json().await?;
        info!(
            index = %index_name,
            host = %desc.host,
            source = %source_type,
            "pinecone index ready"
        );
        Ok(Self::with_client(client, api_key, index_name, &desc.host, source_type))
    }

    /// Build a client for an already-known data-plane host.
    ///
    /// `host` may be given with or without a scheme; `https://` is assumed.
    pub fn with_host(api_key: &str, index_name: &str, host: &str, source_type: SourceType) -> Self {
        Self::with_client(reqwest::Client::new(), api_key, index_name, host, source_type)
    }

    fn with_client(
        client: reqwest::Client,
        api_key: &str,
        index_name: &str,
        host: &str,
        source_type: SourceType,
    ) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            name: index_name.to_string(),
            host: normalize_host(host),
            source_type,
        }
    }

    fn query_body<'a>(&'a self, vector: &'a [f32], top_k: usize) -> QueryRequest<'a> {
        QueryRequest {
            vector,
            top_k,
            include_metadata: false,
            include_values: false,
        }
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn source_type(&self) -> SourceType {
        self.source_type
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<MatchCandidate>, StoreError> {
        let url = format!("{}/query", self.host);
        let resp = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&self.query_body(vector, top_k))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let result: QueryResponse = resp.json().await?;
        debug!(index = %self.name, matches = result.matches.len(), "pinecone query");
        Ok(into_candidates(result, self.source_type))
    }
}

fn into_candidates(resp: QueryResponse, source_type: SourceType) -> Vec<MatchCandidate> {
    resp.matches
        .into_iter()
        .map(|m| MatchCandidate::new(m.id, m.score, source_type))
        .collect()
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_without_scheme_gets_https() {
        assert_eq!(
            normalize_host("ato-legal-database-abc123.svc.aped-4627-b74a.pinecone.io"),
            "https://ato-legal-database-abc123.svc.aped-4627-b74a.pinecone.io"
        );
    }

    #[test]
    fn host_with_scheme_kept_and_trimmed() {
        assert_eq!(normalize_host("http://localhost:5080/"), "http://localhost:5080");
    }

    #[test]
    fn query_body_requests_ids_only() {
        let index = PineconeIndex::with_host("key", "ato", "localhost:5080", SourceType::Document);
        let vector = [0.1f32, 0.2, 0.3];
        let json = serde_json::to_value(index.query_body(&vector, 8)).unwrap();
        assert_eq!(json["topK"], 8);
        assert_eq!(json["includeMetadata"], false);
        assert_eq!(json["includeValues"], false);
        assert_eq!(json["vector"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn response_maps_to_tagged_candidates() {
        let json = r#"{
            "results": [],
            "matches": [
                {"id": "TR 2021/1", "score": 0.91, "values": []},
                {"id": "PCG 2017/13", "score": 0.84, "values": []}
            ],
            "namespace": "",
            "usage": {"readUnits": 5}
        }"#;
        let resp: QueryResponse = serde_json::from_str(json).unwrap();
        let candidates = into_candidates(resp, SourceType::Legislation);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, "TR 2021/1");
        assert_eq!(candidates[0].score, 0.91);
        assert!(candidates.iter().all(|c| c.source_type == SourceType::Legislation));
    }

    #[test]
    fn response_without_matches_is_empty() {
        let resp: QueryResponse = serde_json::from_str(r#"{"namespace": ""}"#).unwrap();
        assert!(into_candidates(resp, SourceType::Document).is_empty());
    }

    #[test]
    fn index_description_host() {
        let json = r#"{"name": "ato-legal-database", "dimension": 1536, "metric": "cosine",
                       "host": "ato-legal-database-x1.svc.pinecone.io", "status": {"ready": true}}"#;
        let desc: IndexDescription = serde_json::from_str(json).unwrap();
        assert_eq!(desc.host, "ato-legal-database-x1.svc.pinecone.io");
    }
}
