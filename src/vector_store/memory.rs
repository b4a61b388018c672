//! In-memory vector store implementation.
//!
//! Useful for testing, demos and small datasets. Contents are lost when the process exits.

use super::{cosine_similarity, rank, Document, IndexedVideo, SearchFilter, SearchResult, VectorStore};
use crate::error::{Result, VidchatError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory vector store.
pub struct MemoryVectorStore {
    documents: RwLock<HashMap<uuid::Uuid, Document>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<uuid::Uuid, Document>>> {
        self.documents
            .read()
            .map_err(|e| VidchatError::Index(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<uuid::Uuid, Document>>> {
        self.documents
            .write()
            .map_err(|e| VidchatError::Index(format!("Failed to acquire lock: {}", e)))
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn add_documents(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self.write()?;
        for doc in docs {
            store.insert(doc.id, doc.clone());
        }
        Ok(docs.len())
    }

    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<SearchResult>> {
        let docs = self.read()?;

        let results: Vec<SearchResult> = docs
            .values()
            .filter(|doc| filter.matches(doc))
            .map(|doc| SearchResult {
                document: doc.clone(),
                score: cosine_similarity(query_embedding, &doc.embedding),
            })
            .collect();

        Ok(rank(results, k))
    }

    async fn delete_by_video_id(&self, video_id: &str) -> Result<usize> {
        let mut docs = self.write()?;
        let initial_len = docs.len();
        docs.retain(|_, doc| doc.video_id != video_id);
        Ok(initial_len - docs.len())
    }

    async fn list_videos(&self) -> Result<Vec<IndexedVideo>> {
        let docs = self.read()?;

        let mut video_map: HashMap<String, IndexedVideo> = HashMap::new();

        for doc in docs.values() {
            let entry = video_map
                .entry(doc.video_id.clone())
                .or_insert_with(|| IndexedVideo {
                    video_id: doc.video_id.clone(),
                    chunk_count: 0,
                    indexed_at: doc.indexed_at,
                });

            entry.chunk_count += 1;
            if doc.indexed_at > entry.indexed_at {
                entry.indexed_at = doc.indexed_at;
            }
        }

        let mut videos: Vec<IndexedVideo> = video_map.into_values().collect();
        videos.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));

        Ok(videos)
    }

    async fn count_for_video(&self, video_id: &str) -> Result<usize> {
        let docs = self.read()?;
        Ok(docs.values().filter(|d| d.video_id == video_id).count())
    }

    async fn document_count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}
