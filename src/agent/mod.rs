//! Routing policy for chat messages.
//!
//! Every message is routed to exactly one of three outcomes: answer directly, retrieve
//! transcript context for the bound video, or ingest a new video. A [`Reasoner`] makes the
//! decision and phrases the reply; the [`Agent`] executes at most one tool per message.

mod llm;
mod rules;
mod runner;
mod tools;

pub use llm::OpenAIReasoner;
pub use rules::RuleReasoner;
pub use runner::{Agent, AgentResponse, ToolCallRecord};
pub use tools::{parse_tool_call, tool_call_for, tool_definitions, ToolContext, INGEST_TOOL, RETRIEVE_TOOL};

use crate::config::{Prompts, ReasonerKind, Settings};
use crate::error::Result;
use crate::ingest::IngestOutcome;
use crate::session::Message;
use async_trait::async_trait;
use std::sync::Arc;

/// What to do with one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Reply without touching any tool. `None` asks the reasoner to phrase the reply.
    AnswerDirect { reply: Option<String> },
    /// Search the transcript of a video.
    Retrieve { query: String, video_id: Option<String> },
    /// Fetch and index a new video.
    Ingest { reference: String },
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::AnswerDirect { .. } => "answer_direct",
            Route::Retrieve { .. } => RETRIEVE_TOOL,
            Route::Ingest { .. } => INGEST_TOOL,
        }
    }
}

/// Input of one routing decision.
#[derive(Debug, Clone, Default)]
pub struct Turn {
    /// The new user message.
    pub message: String,
    /// Earlier messages of the thread, oldest first.
    pub history: Vec<Message>,
    /// Video the thread is bound to.
    pub video_id: Option<String>,
}

impl Turn {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_video(mut self, video_id: Option<String>) -> Self {
        self.video_id = video_id;
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }
}

/// Result of executing a route's tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Direct,
    /// `query` and `video_id` are what the retrieval actually ran with.
    Retrieved {
        query: String,
        video_id: Option<String>,
        context: String,
    },
    Ingested { outcome: IngestOutcome },
}

/// Decides how to handle a message and phrases the final reply.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Pick the route for a message.
    async fn route(&self, turn: &Turn) -> Result<Route>;

    /// Phrase the reply once the route's tool has run.
    async fn respond(&self, turn: &Turn, observation: &Observation) -> Result<String>;
}

/// Create the reasoner selected in settings.
pub fn create_reasoner(settings: &Settings, prompts: &Prompts) -> Result<Arc<dyn Reasoner>> {
    let reasoner: Arc<dyn Reasoner> = match settings.agent.reasoner {
        ReasonerKind::Rules => Arc::new(RuleReasoner::new(prompts.replies.clone())),
        ReasonerKind::OpenAI => Arc::new(OpenAIReasoner::new(&settings.agent.model, prompts.agent.clone())?),
    };
    Ok(reasoner)
}
