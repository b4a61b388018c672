//! Vector store abstraction for Vidchat.
//!
//! Provides a trait-based interface for different vector database backends, and the
//! [`VectorIndex`] facade that pairs a store with an embedder.

mod index;
mod memory;
mod sqlite;

pub use index::VectorIndex;
pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::config::{Settings, VectorStoreProvider};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// An embedded chunk stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID.
    pub id: Uuid,
    /// Video ID this document belongs to.
    pub video_id: String,
    /// Text content of this chunk.
    pub content: String,
    /// Order of this chunk in the video.
    pub chunk_order: i64,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this document was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document.
    pub fn new(video_id: String, content: String, chunk_order: i64, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            video_id,
            content,
            chunk_order,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// Metadata restriction applied to a similarity search.
///
/// Every search is scoped to exactly one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub video_id: String,
}

impl SearchFilter {
    pub fn video(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
        }
    }

    /// Whether a document passes this filter.
    pub fn matches(&self, doc: &Document) -> bool {
        doc.video_id == self.video_id
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Summary information about an indexed video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedVideo {
    /// Video ID.
    pub video_id: String,
    /// Number of indexed chunks.
    pub chunk_count: u32,
    /// When the video was last indexed.
    pub indexed_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store documents. Existing documents are never touched.
    async fn add_documents(&self, docs: &[Document]) -> Result<usize>;

    /// Return the `k` documents most similar to the query, restricted by `filter`.
    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<SearchResult>>;

    /// Delete documents by video ID.
    async fn delete_by_video_id(&self, video_id: &str) -> Result<usize>;

    /// List all indexed videos.
    async fn list_videos(&self) -> Result<Vec<IndexedVideo>>;

    /// Number of documents stored for a video.
    async fn count_for_video(&self, video_id: &str) -> Result<usize>;

    /// Get total document count.
    async fn document_count(&self) -> Result<usize>;
}

/// Create the vector store selected in settings.
pub fn create_vector_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match settings.vector_store.provider {
        VectorStoreProvider::Sqlite => Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
        VectorStoreProvider::Memory => Arc::new(MemoryVectorStore::new()),
    };
    Ok(store)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Sort by descending score and keep the best `k`.
fn rank(mut results: Vec<SearchResult>, k: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.document.chunk_order.cmp(&b.document.chunk_order))
    });
    results.truncate(k);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_filter_matches_only_its_video() {
        let filter = SearchFilter::video("abc123");
        let doc = Document::new("abc123".to_string(), "x".to_string(), 0, vec![]);
        let other = Document::new("zzz999".to_string(), "x".to_string(), 0, vec![]);
        assert!(filter.matches(&doc));
        assert!(!filter.matches(&other));
    }

    #[test]
    fn test_rank_orders_by_score_then_chunk_order() {
        let mk = |order: i64, score: f32| SearchResult {
            document: Document::new("v".to_string(), order.to_string(), order, vec![]),
            score,
        };
        let ranked = rank(vec![mk(2, 0.5), mk(0, 0.9), mk(1, 0.5)], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].document.chunk_order, 0);
        assert_eq!(ranked[1].document.chunk_order, 1);
    }
}
