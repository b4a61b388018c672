//! Tool definitions and implementations for the agent.

use super::{Observation, Route};
use crate::error::{Result, VidchatError};
use crate::ingest::IngestionPipeline;
use crate::rag::Retriever;
use std::sync::Arc;
use tracing::info;

/// Name of the transcript retrieval tool.
pub const RETRIEVE_TOOL: &str = "retrieve";
/// Name of the video ingestion tool.
pub const INGEST_TOOL: &str = "ingest_video";

/// Tool execution context with access to retrieval and ingestion.
pub struct ToolContext {
    pub retriever: Retriever,
    pub ingestion: Arc<IngestionPipeline>,
}

impl ToolContext {
    pub fn new(retriever: Retriever, ingestion: Arc<IngestionPipeline>) -> Self {
        Self {
            retriever,
            ingestion,
        }
    }

    /// Execute the tool behind a route.
    ///
    /// `scope` is the video the thread is bound to; it wins over a video id chosen by the
    /// reasoner.
    pub async fn execute(&self, route: &Route, scope: Option<&str>) -> Result<Observation> {
        match route {
            Route::AnswerDirect { .. } => Ok(Observation::Direct),
            Route::Retrieve { query, video_id } => {
                let video_id = scope.or(video_id.as_deref());
                info!("Retrieving for video {:?}", video_id);
                let context = self.retriever.retrieve(query, video_id).await?;
                Ok(Observation::Retrieved {
                    query: query.clone(),
                    video_id: video_id.map(str::to_string),
                    context,
                })
            }
            Route::Ingest { reference } => {
                info!("Ingesting {}", reference);
                let outcome = self.ingestion.ingest(reference).await?;
                Ok(Observation::Ingested { outcome })
            }
        }
    }
}

/// Get OpenAI function/tool definitions for the agent.
pub fn tool_definitions() -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    vec![
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: RETRIEVE_TOOL.to_string(),
                description: Some(
                    "Retrieve transcript passages of the current video that are relevant to a question. \
                    Use this for any question about the video's content."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The question to search the transcript for"
                        },
                        "video_id": {
                            "type": "string",
                            "description": "The video ID to search in"
                        }
                    },
                    "required": ["query"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: INGEST_TOOL.to_string(),
                description: Some(
                    "Fetch and index the transcript of a YouTube video so it can be asked about. \
                    Use this when the user shares a new YouTube URL."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "url": {
                            "type": "string",
                            "description": "The YouTube URL or video ID"
                        }
                    },
                    "required": ["url"]
                })),
                strict: None,
            },
        },
    ]
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<Route> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| VidchatError::Agent(format!("Invalid tool arguments: {}", e)))?;

    match name {
        RETRIEVE_TOOL => {
            let query = args["query"]
                .as_str()
                .ok_or_else(|| VidchatError::Agent("Missing 'query' argument".to_string()))?
                .to_string();
            let video_id = args["video_id"]
                .as_str()
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string);
            Ok(Route::Retrieve { query, video_id })
        }
        INGEST_TOOL => {
            let reference = args["url"]
                .as_str()
                .ok_or_else(|| VidchatError::Agent("Missing 'url' argument".to_string()))?
                .to_string();
            Ok(Route::Ingest { reference })
        }
        _ => Err(VidchatError::Agent(format!("Unknown tool: {}", name))),
    }
}

/// Tool name and JSON arguments for a route, the inverse of [`parse_tool_call`].
pub fn tool_call_for(route: &Route) -> Option<(&'static str, String)> {
    match route {
        Route::AnswerDirect { .. } => None,
        Route::Retrieve { query, video_id } => Some((
            RETRIEVE_TOOL,
            serde_json::json!({ "query": query, "video_id": video_id }).to_string(),
        )),
        Route::Ingest { reference } => Some((
            INGEST_TOOL,
            serde_json::json!({ "url": reference }).to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definitions() {
        let tools = tool_definitions();
        let names: Vec<&str> = tools.iter().map(|t| t.function.name.as_str()).collect();
        assert_eq!(names, vec!["retrieve", "ingest_video"]);
    }

    #[test]
    fn test_parse_retrieve() {
        let route = parse_tool_call("retrieve", r#"{"query": "What are Chronoc beans?", "video_id": "video_014"}"#)
            .unwrap();
        assert_eq!(
            route,
            Route::Retrieve {
                query: "What are Chronoc beans?".to_string(),
                video_id: Some("video_014".to_string()),
            }
        );

        let route = parse_tool_call("retrieve", r#"{"query": "q", "video_id": ""}"#).unwrap();
        assert!(matches!(route, Route::Retrieve { video_id: None, .. }));
    }

    #[test]
    fn test_parse_ingest() {
        let route = parse_tool_call("ingest_video", r#"{"url": "https://youtu.be/abc123"}"#).unwrap();
        assert_eq!(
            route,
            Route::Ingest {
                reference: "https://youtu.be/abc123".to_string()
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_tool_call("retrieve", "not json").is_err());
        assert!(parse_tool_call("retrieve", "{}").is_err());
        assert!(parse_tool_call("delete_everything", "{}").is_err());
    }

    #[test]
    fn test_tool_call_round_trips_through_parse() {
        let route = Route::Ingest {
            reference: "abc123".to_string(),
        };
        let (name, args) = tool_call_for(&route).unwrap();
        assert_eq!(parse_tool_call(name, &args).unwrap(), route);
        assert!(tool_call_for(&Route::AnswerDirect { reply: None }).is_none());
    }
}
