//! Ingestion pipeline for Vidchat.
//!
//! Resolves a video reference, fetches its transcript, caches it, chunks it and adds the
//! chunks to the vector index.

use crate::chunking::TextSplitter;
use crate::error::{Result, VidchatError};
use crate::transcript::{parse_video_reference, TranscriptCache, TranscriptProvider, VideoDocument};
use crate::vector_store::VectorIndex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of indexing one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestOutcome {
    /// Canonical video id.
    pub video_id: String,
    /// Number of chunks added to the index.
    pub chunks_indexed: usize,
    /// Chunks removed before indexing (only with `replace_existing`).
    pub replaced: usize,
    /// Set when the transcript could not be written to the cache.
    pub cache_error: Option<String>,
}

/// Transcript provider, cache, splitter and index wired together.
pub struct IngestionPipeline {
    provider: Arc<dyn TranscriptProvider>,
    cache: TranscriptCache,
    splitter: TextSplitter,
    index: Arc<VectorIndex>,
    replace_existing: bool,
}

impl IngestionPipeline {
    pub fn new(
        provider: Arc<dyn TranscriptProvider>,
        cache: TranscriptCache,
        splitter: TextSplitter,
        index: Arc<VectorIndex>,
    ) -> Self {
        Self {
            provider,
            cache,
            splitter,
            index,
            replace_existing: false,
        }
    }

    /// Delete a video's existing chunks before re-indexing it.
    pub fn with_replace_existing(mut self, replace_existing: bool) -> Self {
        self.replace_existing = replace_existing;
        self
    }

    pub fn cache(&self) -> &TranscriptCache {
        &self.cache
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Ingest a YouTube URL or bare video id.
    ///
    /// Nothing is written to the index unless the reference parses and a non-empty
    /// transcript was fetched.
    #[instrument(skip(self), fields(video_ref = %video_ref))]
    pub async fn ingest(&self, video_ref: &str) -> Result<IngestOutcome> {
        let video_id = parse_video_reference(video_ref)?;

        info!("Fetching transcript for {}", video_id);
        let doc = self.provider.fetch(&video_id).await?;

        // Providers may echo a different id; the parsed one owns the chunks.
        let doc = VideoDocument::new(video_id, doc.transcript);
        self.ingest_document(&doc).await
    }

    /// Index an already fetched transcript.
    ///
    /// An empty transcript is a `Fetch` error and leaves the cache and index untouched.
    #[instrument(skip(self, doc), fields(video_id = %doc.video_id))]
    pub async fn ingest_document(&self, doc: &VideoDocument) -> Result<IngestOutcome> {
        if doc.transcript.trim().is_empty() {
            return Err(VidchatError::Fetch(format!("Empty transcript for {}", doc.video_id)));
        }

        let cache_error = self.cache.save(doc).await.err().map(|e| {
            warn!("Failed to cache transcript for {}: {}", doc.video_id, e);
            e.to_string()
        });

        let mut outcome = self.index_document(doc).await?;
        outcome.cache_error = cache_error;
        Ok(outcome)
    }

    /// Re-chunk and re-index a video from its cached transcript, without fetching.
    ///
    /// Always replaces the video's existing chunks.
    #[instrument(skip(self))]
    pub async fn reindex(&self, video_id: &str) -> Result<IngestOutcome> {
        let doc = self.cache.load(video_id).await?.ok_or_else(|| {
            VidchatError::Fetch(format!("No cached transcript for {}", video_id))
        })?;

        let replaced = self.index.delete_video(&doc.video_id).await?;
        let chunks = self.splitter.split_document(&doc);
        let chunks_indexed = self.index.add_documents(&chunks).await?;

        info!("Re-indexed {} with {} chunks", doc.video_id, chunks_indexed);
        Ok(IngestOutcome {
            video_id: doc.video_id,
            chunks_indexed,
            replaced,
            cache_error: None,
        })
    }

    async fn index_document(&self, doc: &VideoDocument) -> Result<IngestOutcome> {
        let chunks = self.splitter.split_document(doc);
        info!("Split {} into {} chunks", doc.video_id, chunks.len());

        let replaced = if self.replace_existing {
            self.index.delete_video(&doc.video_id).await?
        } else {
            0
        };

        let chunks_indexed = self.index.add_documents(&chunks).await?;
        info!("Indexed {} chunks for {}", chunks_indexed, doc.video_id);

        Ok(IngestOutcome {
            video_id: doc.video_id.clone(),
            chunks_indexed,
            replaced,
            cache_error: None,
        })
    }
}
