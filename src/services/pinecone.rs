use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Duration;

use crate::services::vector::{VectorIndex, VectorIndexError, VectorMatch, VectorRecord};

/// Pinecone data-plane client for one index namespace.
///
/// Talks to the index host directly over REST with the `Api-Key` header.
pub struct PineconeIndex {
    host: String,
    api_key: String,
    namespace: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    namespace: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    namespace: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<VectorMatch>,
}

#[derive(Debug, Deserialize)]
struct FetchResponse {
    #[serde(default)]
    vectors: HashMap<String, VectorRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceStats {
    #[serde(default)]
    vector_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStats {
    #[serde(default)]
    namespaces: HashMap<String, NamespaceStats>,
}

impl PineconeIndex {
    pub fn new(host: &str, api_key: String, namespace: String, timeout: Duration) -> Result<Self, VectorIndexError> {
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", host.trim_end_matches('/'))
        };

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            host,
            api_key,
            namespace,
            client,
        })
    }

    pub fn from_settings(settings: &crate::config::PineconeSettings) -> Result<Self, VectorIndexError> {
        Self::new(
            &settings.index_host,
            settings.api_key.clone(),
            settings.namespace.clone(),
            Duration::from_secs(30),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    async fn check(response: Response) -> Result<Response, VectorIndexError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(VectorIndexError::ApiError {
            status: status.as_u16(),
            message,
        })
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<Response, VectorIndexError> {
        let response = self
            .client
            .post(self.url(path))
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await?;
        Self::check(response).await
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, id: &str, values: Vec<f32>, metadata: Map<String, Value>) -> Result<(), VectorIndexError> {
        let record = VectorRecord {
            id: id.to_string(),
            values,
            metadata,
        };
        self.batch_upsert(vec![record], 1).await.map(|_| ())
    }

    async fn query(
        &self,
        values: &[f32],
        top_k: usize,
        filter: Option<&Value>,
    ) -> Result<Vec<VectorMatch>, VectorIndexError> {
        let body = QueryRequest {
            vector: values,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: &self.namespace,
            filter,
        };

        let response: QueryResponse = self
            .post("/query", &body)
            .await?
            .json()
            .await
            .map_err(|e| VectorIndexError::InvalidResponse(e.to_string()))?;

        tracing::debug!("Pinecone query returned {} matches", response.matches.len());
        Ok(response.matches)
    }

    async fn fetch(&self, id: &str) -> Result<Option<VectorRecord>, VectorIndexError> {
        let response = self
            .client
            .get(self.url("/vectors/fetch"))
            .header("Api-Key", &self.api_key)
            .query(&[("ids", id), ("namespace", self.namespace.as_str())])
            .send()
            .await?;

        let mut body: FetchResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| VectorIndexError::InvalidResponse(e.to_string()))?;

        Ok(body.vectors.remove(id))
    }

    async fn delete(&self, id: &str) -> Result<(), VectorIndexError> {
        self.post("/vectors/delete", &json!({ "ids": [id], "namespace": self.namespace }))
            .await?;
        Ok(())
    }

    async fn batch_upsert(&self, records: Vec<VectorRecord>, batch_size: usize) -> Result<usize, VectorIndexError> {
        let mut written = 0;
        for chunk in records.chunks(batch_size.max(1)) {
            let body = UpsertRequest {
                vectors: chunk,
                namespace: &self.namespace,
            };
            self.post("/vectors/upsert", &body).await?;
            written += chunk.len();
            tracing::debug!("Upserted {} vectors to Pinecone", chunk.len());
        }
        Ok(written)
    }

    async fn count(&self) -> Result<u64, VectorIndexError> {
        let stats: IndexStats = self
            .post("/describe_index_stats", &json!({}))
            .await?
            .json()
            .await
            .map_err(|e| VectorIndexError::InvalidResponse(e.to_string()))?;

        Ok(stats
            .namespaces
            .get(&self.namespace)
            .map(|ns| ns.vector_count)
            .unwrap_or(0))
    }
}
