//! Component wiring for Vidchat.
//!
//! Builds every collaborator from [`Settings`] once and hands out shared handles, so the
//! server and CLI commands run against the same embedder, store and sessions.

use crate::agent::{create_reasoner, Agent, ToolContext};
use crate::chat::ChatService;
use crate::chunking::TextSplitter;
use crate::config::{Prompts, Settings};
use crate::embedding::create_embedder;
use crate::error::Result;
use crate::ingest::IngestionPipeline;
use crate::rag::Retriever;
use crate::session::SessionStore;
use crate::transcript::{TranscriptCache, TranscriptProvider, YoutubeTranscriptProvider};
use crate::vector_store::{create_vector_store, VectorIndex};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The fully wired application.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    index: Arc<VectorIndex>,
    ingestion: Arc<IngestionPipeline>,
    retriever: Retriever,
    chat: Arc<ChatService>,
}

impl Orchestrator {
    /// Wire the application with the YouTube transcript provider.
    pub fn new(settings: Settings) -> Result<Self> {
        let provider = Arc::new(YoutubeTranscriptProvider::new()?);
        Self::with_provider(settings, provider)
    }

    /// Wire the application with a custom transcript provider.
    pub fn with_provider(settings: Settings, provider: Arc<dyn TranscriptProvider>) -> Result<Self> {
        settings.validate()?;
        let prompts = Prompts::with_system_override(settings.prompts.system.as_deref());

        let embedder = create_embedder(&settings.embedding)?;
        let store = create_vector_store(&settings)?;
        let index = Arc::new(VectorIndex::new(embedder, store));
        info!(
            "Using {} embeddings and {} vector store",
            settings.embedding.provider, settings.vector_store.provider
        );

        let ingestion = Arc::new(
            IngestionPipeline::new(
                provider,
                TranscriptCache::new(settings.cache_dir()),
                TextSplitter::from_settings(&settings.chunking)?,
                index.clone(),
            )
            .with_replace_existing(settings.ingest.replace_existing),
        );

        let retriever = Retriever::new(index.clone()).with_top_k(settings.retrieval.top_k);

        let reasoner = create_reasoner(&settings, &prompts)?;
        info!("Using {} reasoner", settings.agent.reasoner);
        let agent = Agent::new(reasoner, ToolContext::new(retriever.clone(), ingestion.clone()))
            .with_replies(prompts.replies.clone());

        let chat = Arc::new(
            ChatService::new(Arc::new(SessionStore::new()), Arc::new(agent))
                .with_timeout(Duration::from_secs(settings.server.request_timeout_secs))
                .with_max_history(settings.agent.max_history),
        );

        Ok(Self {
            settings,
            prompts,
            index,
            ingestion,
            retriever,
            chat,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    pub fn index(&self) -> Arc<VectorIndex> {
        self.index.clone()
    }

    pub fn ingestion(&self) -> Arc<IngestionPipeline> {
        self.ingestion.clone()
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn chat(&self) -> Arc<ChatService> {
        self.chat.clone()
    }
}
