//! Text-level facade over an embedder and a vector store.

use super::{Document, IndexedVideo, SearchFilter, SearchResult, VectorStore};
use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::error::{Result, VidchatError};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Embeds text on the way in and on the way out of a [`VectorStore`].
pub struct VectorIndex {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl VectorIndex {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Embed and store chunks. Returns the number of documents written.
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    pub async fn add_documents(&self, chunks: &[Chunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(VidchatError::Index(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let docs: Vec<Document> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                Document::new(
                    chunk.video_id.clone(),
                    chunk.content.clone(),
                    chunk.order as i64,
                    embedding,
                )
            })
            .collect();

        self.store.add_documents(&docs).await
    }

    /// Embed the query and return the closest documents that pass `filter`.
    #[instrument(skip(self, query))]
    pub async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: &SearchFilter,
    ) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedder.embed(query).await?;
        let results = self.store.similarity_search(&query_embedding, k, filter).await?;
        debug!("Index returned {} results", results.len());
        Ok(results)
    }

    pub async fn delete_video(&self, video_id: &str) -> Result<usize> {
        self.store.delete_by_video_id(video_id).await
    }

    pub async fn list_videos(&self) -> Result<Vec<IndexedVideo>> {
        self.store.list_videos().await
    }

    pub async fn count_for_video(&self, video_id: &str) -> Result<usize> {
        self.store.count_for_video(video_id).await
    }

    pub async fn document_count(&self) -> Result<usize> {
        self.store.document_count().await
    }
}
