//! Scoped similarity retrieval.

use crate::error::{Result, VidchatError};
use crate::vector_store::{SearchFilter, VectorIndex};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Number of chunks returned when nothing else is configured.
pub const DEFAULT_TOP_K: usize = 3;

/// Turns a question into transcript context for one video.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    top_k: usize,
}

impl Retriever {
    pub fn new(index: Arc<VectorIndex>) -> Self {
        Self {
            index,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set how many chunks are returned.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Return the contents of the best matching chunks of `video_id`, joined by newlines.
    ///
    /// Returns at most [`top_k`](Self::top_k) chunks. Fails with
    /// [`VidchatError::MissingScope`] when no video is given. An empty string means nothing
    /// in that video matched.
    pub async fn retrieve(&self, query: &str, video_id: Option<&str>) -> Result<String> {
        self.retrieve_k(query, video_id, self.top_k).await
    }

    /// [`retrieve`](Self::retrieve) with an explicit chunk count for this call.
    #[instrument(skip(self, query))]
    pub async fn retrieve_k(&self, query: &str, video_id: Option<&str>, k: usize) -> Result<String> {
        let k = k.max(1);
        let video_id = video_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(VidchatError::MissingScope)?;

        let filter = SearchFilter::video(video_id);
        let results = self.index.similarity_search(query, k, &filter).await?;

        let total = results.len();
        let contents: Vec<String> = results
            .into_iter()
            .filter(|r| filter.matches(&r.document))
            .map(|r| r.document.content)
            .collect();

        if contents.len() != total {
            warn!(
                "Store returned {} chunks outside video {}",
                total - contents.len(),
                video_id
            );
        }

        debug!("Retrieved {} chunks for video {}", contents.len(), video_id);
        Ok(contents.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;
    use crate::embedding::HashingEmbedder;
    use crate::transcript::demo_corpus;
    use crate::vector_store::MemoryVectorStore;

    async fn seeded_retriever() -> Retriever {
        let index = Arc::new(VectorIndex::new(
            Arc::new(HashingEmbedder::default()),
            Arc::new(MemoryVectorStore::new()),
        ));

        let chunks: Vec<Chunk> = demo_corpus()
            .iter()
            .map(|video| Chunk::new(video.transcript.to_string(), video.video_id.to_string(), 0))
            .collect();
        index.add_documents(&chunks).await.unwrap();

        Retriever::new(index)
    }

    #[tokio::test]
    async fn test_retrieve_scoped_to_video() {
        let retriever = seeded_retriever().await;

        let context = retriever
            .retrieve("What are Chronoc beans?", Some("video_014"))
            .await
            .unwrap();
        assert!(context.contains("Chronoc beans"));
        assert!(!context.contains("Zarnok"));
    }

    #[tokio::test]
    async fn test_unrelated_video_returns_empty() {
        let retriever = seeded_retriever().await;

        let context = retriever
            .retrieve("What are Chronoc beans?", Some("video_999"))
            .await
            .unwrap();
        assert_eq!(context, "");
    }

    #[tokio::test]
    async fn test_missing_scope() {
        let retriever = seeded_retriever().await;

        assert!(matches!(
            retriever.retrieve("anything", None).await,
            Err(VidchatError::MissingScope)
        ));
        assert!(matches!(
            retriever.retrieve("anything", Some("  ")).await,
            Err(VidchatError::MissingScope)
        ));
    }

    #[tokio::test]
    async fn test_joins_in_ranked_order() {
        let index = Arc::new(VectorIndex::new(
            Arc::new(HashingEmbedder::default()),
            Arc::new(MemoryVectorStore::new()),
        ));
        let chunks = vec![
            Chunk::new("Zarnok towers float.".to_string(), "v".to_string(), 0),
            Chunk::new("Zarnok towers float above Zarnok bay.".to_string(), "v".to_string(), 1),
        ];
        index.add_documents(&chunks).await.unwrap();

        let context = Retriever::new(index)
            .with_top_k(2)
            .retrieve("Zarnok towers float", Some("v"))
            .await
            .unwrap();
        assert_eq!(context.lines().count(), 2);
        assert_eq!(context.lines().next(), Some("Zarnok towers float."));
    }

    #[tokio::test]
    async fn test_retrieve_k_overrides_default() {
        let index = Arc::new(VectorIndex::new(
            Arc::new(HashingEmbedder::default()),
            Arc::new(MemoryVectorStore::new()),
        ));
        let chunks: Vec<Chunk> = (0..5)
            .map(|i| Chunk::new(format!("Zarnok towers float, part {}.", i), "v".to_string(), i))
            .collect();
        index.add_documents(&chunks).await.unwrap();
        let retriever = Retriever::new(index);

        let default = retriever.retrieve("Zarnok towers", Some("v")).await.unwrap();
        assert_eq!(default.lines().count(), DEFAULT_TOP_K);

        let wider = retriever.retrieve_k("Zarnok towers", Some("v"), 5).await.unwrap();
        assert_eq!(wider.lines().count(), 5);

        let clamped = retriever.retrieve_k("Zarnok towers", Some("v"), 0).await.unwrap();
        assert_eq!(clamped.lines().count(), 1);
        assert_eq!(retriever.top_k(), DEFAULT_TOP_K);
    }
}
