//! Agent runner: one routing decision and at most one tool call per message.

use super::tools::{tool_call_for, ToolContext};
use super::{Observation, Reasoner, Route, Turn};
use crate::config::{Prompts, ReplyTemplates};
use crate::error::VidchatError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Routes messages and turns tool results into replies.
pub struct Agent {
    reasoner: Arc<dyn Reasoner>,
    tools: ToolContext,
    replies: ReplyTemplates,
}

impl Agent {
    pub fn new(reasoner: Arc<dyn Reasoner>, tools: ToolContext) -> Self {
        Self {
            reasoner,
            tools,
            replies: ReplyTemplates::default(),
        }
    }

    /// Set the templates used for replies the agent writes itself.
    pub fn with_replies(mut self, replies: ReplyTemplates) -> Self {
        self.replies = replies;
        self
    }

    /// Handle one user message. Never fails: errors become user-facing replies.
    #[instrument(skip(self, turn), fields(video_id = ?turn.video_id))]
    pub async fn handle(&self, turn: &Turn) -> AgentResponse {
        let route = match self.reasoner.route(turn).await {
            Ok(route) => route,
            Err(e) => {
                warn!("Routing failed: {}", e);
                return AgentResponse::text(e.user_message());
            }
        };
        info!("Route: {}", route.name());

        if let Route::AnswerDirect { reply } = &route {
            let content = match reply {
                Some(reply) => reply.clone(),
                None => self.respond_or_apologize(turn, &Observation::Direct).await,
            };
            return AgentResponse::text(content);
        }

        let mut record = ToolCallRecord::from_route(&route);

        let observation = match self.tools.execute(&route, turn.video_id.as_deref()).await {
            Ok(observation) => observation,
            Err(e) => {
                warn!("Tool {} failed: {}", record.name, e);
                record.result = e.to_string();
                let content = match e {
                    VidchatError::MissingScope => self.replies.needs_video.clone(),
                    other => other.user_message().to_string(),
                };
                return AgentResponse {
                    content,
                    tool_call: Some(record),
                    bound_video: None,
                };
            }
        };

        match observation {
            Observation::Retrieved { ref context, .. } if context.trim().is_empty() => {
                record.result = String::new();
                AgentResponse {
                    content: self.replies.no_context.clone(),
                    tool_call: Some(record),
                    bound_video: None,
                }
            }
            Observation::Ingested { ref outcome } => {
                record.result = format!("{} chunks indexed", outcome.chunks_indexed);
                let bound_turn = turn.clone().with_video(Some(outcome.video_id.clone()));

                let content = match self.reasoner.respond(&bound_turn, &observation).await {
                    Ok(content) => content,
                    Err(e) => {
                        warn!("Reply after ingest failed: {}", e);
                        self.ingested_ack(&outcome.video_id, outcome.chunks_indexed)
                    }
                };

                AgentResponse {
                    content,
                    tool_call: Some(record),
                    bound_video: Some(outcome.video_id.clone()),
                }
            }
            other => {
                if let Observation::Retrieved { context, .. } = &other {
                    record.result = context.clone();
                }
                let content = self.respond_or_apologize(turn, &other).await;
                AgentResponse {
                    content,
                    tool_call: Some(record),
                    bound_video: None,
                }
            }
        }
    }

    async fn respond_or_apologize(&self, turn: &Turn, observation: &Observation) -> String {
        match self.reasoner.respond(turn, observation).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Reply generation failed: {}", e);
                e.user_message().to_string()
            }
        }
    }

    fn ingested_ack(&self, video_id: &str, chunks: usize) -> String {
        let mut vars = HashMap::new();
        vars.insert("video_id".to_string(), video_id.to_string());
        vars.insert("chunks".to_string(), chunks.to_string());
        Prompts::render(&self.replies.ingested, &vars)
    }
}

/// Response from handling one message.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The reply shown to the user.
    pub content: String,
    /// The tool call made, if any.
    pub tool_call: Option<ToolCallRecord>,
    /// Video the thread should be bound to after this message.
    pub bound_video: Option<String>,
}

impl AgentResponse {
    fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_call: None,
            bound_video: None,
        }
    }
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl ToolCallRecord {
    fn from_route(route: &Route) -> Self {
        let (name, arguments) = tool_call_for(route).unwrap_or((route.name(), String::new()));
        Self {
            name: name.to_string(),
            arguments,
            result: String::new(),
        }
    }
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
