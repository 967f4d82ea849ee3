use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::core::encoder::cosine_similarity;

/// Errors that can occur when talking to a vector index
#[derive(Debug, Error)]
pub enum VectorIndexError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Index returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Vector has {actual} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// A stored vector with its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A query hit, best first in any returned list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Nearest-neighbour store for taste embeddings
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn upsert(&self, id: &str, values: Vec<f32>, metadata: Map<String, Value>) -> Result<(), VectorIndexError>;

    /// Up to `top_k` nearest vectors by cosine similarity, best first
    async fn query(
        &self,
        values: &[f32],
        top_k: usize,
        filter: Option<&Value>,
    ) -> Result<Vec<VectorMatch>, VectorIndexError>;

    async fn fetch(&self, id: &str) -> Result<Option<VectorRecord>, VectorIndexError>;

    async fn delete(&self, id: &str) -> Result<(), VectorIndexError>;

    /// Upsert many records, `batch_size` per request; returns the number written
    async fn batch_upsert(&self, records: Vec<VectorRecord>, batch_size: usize) -> Result<usize, VectorIndexError>;

    /// Number of vectors currently stored
    async fn count(&self) -> Result<u64, VectorIndexError>;
}

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Does `metadata` satisfy a Pinecone-style filter?
///
/// Supports `{"field": {"$eq": v}}`, `{"field": {"$ne": v}}`,
/// `{"field": {"$in": [..]}}` and the bare `{"field": v}` shorthand.
/// Every field in the filter must match.
pub fn matches_filter(metadata: &Map<String, Value>, filter: &Value) -> bool {
    let Some(conditions) = filter.as_object() else {
        return true;
    };

    conditions.iter().all(|(field, condition)| {
        let actual = metadata.get(field);
        match condition.as_object() {
            Some(ops) => ops.iter().all(|(op, expected)| match op.as_str() {
                "$eq" => actual == Some(expected),
                "$ne" => actual != Some(expected),
                "$in" => expected
                    .as_array()
                    .map(|options| actual.is_some_and(|a| options.contains(a)))
                    .unwrap_or(false),
                _ => false,
            }),
            None => actual == Some(condition),
        }
    })
}

/// Exact cosine kNN held in process memory.
///
/// Used when no hosted index is configured and in tests. Query cost is
/// linear in the number of stored vectors.
pub struct InMemoryVectorIndex {
    dimension: usize,
    records: RwLock<HashMap<String, VectorRecord>>,
}

impl InMemoryVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            records: RwLock::new(HashMap::new()),
        }
    }

    fn check_dimension(&self, values: &[f32]) -> Result<(), VectorIndexError> {
        if values.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: values.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, id: &str, values: Vec<f32>, metadata: Map<String, Value>) -> Result<(), VectorIndexError> {
        self.check_dimension(&values)?;
        let record = VectorRecord {
            id: id.to_string(),
            values,
            metadata,
        };
        self.records.write().await.insert(id.to_string(), record);
        Ok(())
    }

    async fn query(
        &self,
        values: &[f32],
        top_k: usize,
        filter: Option<&Value>,
    ) -> Result<Vec<VectorMatch>, VectorIndexError> {
        self.check_dimension(values)?;
        let records = self.records.read().await;

        let mut hits: Vec<VectorMatch> = records
            .values()
            .filter(|r| filter.map_or(true, |f| matches_filter(&r.metadata, f)))
            .map(|r| VectorMatch {
                id: r.id.clone(),
                score: cosine_similarity(values, &r.values),
                metadata: Some(r.metadata.clone()),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn fetch(&self, id: &str) -> Result<Option<VectorRecord>, VectorIndexError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<(), VectorIndexError> {
        self.records.write().await.remove(id);
        Ok(())
    }

    async fn batch_upsert(&self, records: Vec<VectorRecord>, batch_size: usize) -> Result<usize, VectorIndexError> {
        let mut written = 0;
        for chunk in records.chunks(batch_size.max(1)) {
            for record in chunk {
                self.check_dimension(&record.values)?;
            }
            let mut store = self.records.write().await;
            for record in chunk {
                store.insert(record.id.clone(), record.clone());
            }
            written += chunk.len();
        }
        Ok(written)
    }

    async fn count(&self) -> Result<u64, VectorIndexError> {
        Ok(self.records.read().await.len() as u64)
    }
}
