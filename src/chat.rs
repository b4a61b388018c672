//! Chat service: one request in, one reply out.
//!
//! Loads the thread's session, runs the agent under a timeout and records the exchange.

use crate::agent::{Agent, Turn};
use crate::error::{Result, VidchatError};
use crate::session::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default per-request time limit.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Entry point shared by the HTTP server and the CLI chat loop.
pub struct ChatService {
    sessions: Arc<SessionStore>,
    agent: Arc<Agent>,
    timeout: Duration,
    max_history: usize,
}

impl ChatService {
    pub fn new(sessions: Arc<SessionStore>, agent: Arc<Agent>) -> Self {
        Self {
            sessions,
            agent,
            timeout: DEFAULT_TIMEOUT,
            max_history: 20,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Answer one message on a thread.
    ///
    /// A `video_id` in the request rebinds the thread to that video. Internal failures
    /// come back as user-facing text; only session bookkeeping errors are returned.
    #[instrument(skip(self, query), fields(thread_id = %thread_id))]
    pub async fn generate(&self, query: &str, video_id: Option<&str>, thread_id: &str) -> Result<String> {
        if let Some(video_id) = video_id.map(str::trim).filter(|id| !id.is_empty()) {
            self.sessions.bind_video(thread_id, video_id)?;
        }

        let session = self.sessions.get_or_create(thread_id)?;
        let turn = Turn::new(query)
            .with_video(session.video_id.clone())
            .with_history(session.recent(self.max_history).to_vec());

        let (reply, bound_video) = match tokio::time::timeout(self.timeout, self.agent.handle(&turn)).await {
            Ok(response) => {
                if let Some(call) = &response.tool_call {
                    debug!("Tool call: {}", call);
                }
                (response.content, response.bound_video)
            }
            Err(_) => {
                let err = VidchatError::Timeout(self.timeout.as_secs());
                warn!("{}", err);
                (err.user_message().to_string(), None)
            }
        };

        let recorded = self
            .sessions
            .record_turn(thread_id, query, &reply, bound_video.as_deref())?;
        if !recorded {
            warn!("Thread {} was reset while answering; exchange not recorded", thread_id);
        }
        Ok(reply)
    }

    /// Start a fresh thread in place of `thread_id`.
    pub fn reset(&self, thread_id: &str) -> Result<String> {
        self.sessions.reset(thread_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Observation, Reasoner, Route, RuleReasoner, ToolContext};
    use crate::chunking::TextSplitter;
    use crate::embedding::HashingEmbedder;
    use crate::ingest::IngestionPipeline;
    use crate::rag::Retriever;
    use crate::session::Role;
    use crate::transcript::{StaticTranscriptProvider, TranscriptCache};
    use crate::vector_store::{MemoryVectorStore, VectorIndex};
    use async_trait::async_trait;
    use tempfile::TempDir;

    fn tools(dir: &TempDir) -> ToolContext {
        let index = Arc::new(VectorIndex::new(
            Arc::new(HashingEmbedder::default()),
            Arc::new(MemoryVectorStore::new()),
        ));
        let ingestion = Arc::new(IngestionPipeline::new(
            Arc::new(StaticTranscriptProvider::demo()),
            TranscriptCache::new(dir.path()),
            TextSplitter::new(1000, 200).unwrap(),
            index.clone(),
        ));
        ToolContext::new(Retriever::new(index), ingestion)
    }

    fn service(dir: &TempDir) -> ChatService {
        let agent = Agent::new(Arc::new(RuleReasoner::default()), tools(dir));
        ChatService::new(Arc::new(SessionStore::new()), Arc::new(agent))
    }

    #[tokio::test]
    async fn test_generate_records_exchange() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let reply = service.generate("hello", None, "1").await.unwrap();
        assert!(!reply.is_empty());

        let history = service.sessions().history("1", 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].text, "hello");
        assert_eq!(history[1].text, reply);
    }

    #[tokio::test]
    async fn test_ingest_then_ask_on_same_thread() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        service.generate("add video video_014", None, "t").await.unwrap();
        let reply = service.generate("What are Chronoc beans?", None, "t").await.unwrap();
        assert!(reply.contains("Chronoc beans"));

        // Another thread is not bound to the video.
        let other = service.generate("What are Chronoc beans?", None, "u").await.unwrap();
        assert!(!other.contains("Chronoc beans"));
    }

    #[tokio::test]
    async fn test_request_video_id_scopes_retrieval() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        service.generate("add video video_014", None, "seed").await.unwrap();

        let reply = service
            .generate("What are Chronoc beans?", Some("video_014"), "fresh")
            .await
            .unwrap();
        assert!(reply.contains("Chronoc beans"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_returns_message() {
        struct Slow;

        #[async_trait]
        impl Reasoner for Slow {
            async fn route(&self, _turn: &Turn) -> Result<Route> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Route::AnswerDirect { reply: None })
            }

            async fn respond(&self, _turn: &Turn, _observation: &Observation) -> Result<String> {
                Ok("too late".to_string())
            }
        }

        let dir = TempDir::new().unwrap();
        let agent = Agent::new(Arc::new(Slow), tools(&dir));
        let service = ChatService::new(Arc::new(SessionStore::new()), Arc::new(agent))
            .with_timeout(Duration::from_secs(5));

        let reply = service.generate("hello", None, "1").await.unwrap();
        assert_eq!(reply, VidchatError::Timeout(5).user_message());
        assert_eq!(service.sessions().history("1", 10).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_starts_empty_thread() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        service.generate("hello", None, "1").await.unwrap();

        let new_id = service.reset("1").unwrap();
        assert_ne!(new_id, "1");
        assert!(service.sessions().history(&new_id, 10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_during_turn_does_not_revive_thread() {
        struct ResetsThread(Arc<SessionStore>);

        #[async_trait]
        impl Reasoner for ResetsThread {
            async fn route(&self, _turn: &Turn) -> Result<Route> {
                self.0.reset("1")?;
                Ok(Route::AnswerDirect {
                    reply: Some("done".to_string()),
                })
            }

            async fn respond(&self, _turn: &Turn, _observation: &Observation) -> Result<String> {
                Ok("done".to_string())
            }
        }

        let dir = TempDir::new().unwrap();
        let sessions = Arc::new(SessionStore::new());
        let agent = Agent::new(Arc::new(ResetsThread(sessions.clone())), tools(&dir));
        let service = ChatService::new(sessions.clone(), Arc::new(agent));

        let reply = service.generate("hello", None, "1").await.unwrap();
        assert_eq!(reply, "done");
        assert!(sessions.history("1", 10).unwrap().is_empty());
        assert_eq!(sessions.len(), 1);
    }
}
