//! Reasoner backed by an OpenAI chat model with function tools.

use super::tools::{parse_tool_call, tool_call_for, tool_definitions};
use super::{Observation, Reasoner, Route, Turn};
use crate::config::{AgentPrompts, Prompts};
use crate::error::{Result, VidchatError};
use crate::openai::create_client;
use crate::session::Role;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionToolChoiceOption, ChatCompletionToolType, CreateChatCompletionRequestArgs,
    CreateChatCompletionResponse, FunctionCall,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Id given to the replayed tool call when the tool result is sent back.
const TOOL_CALL_ID: &str = "call_route";

/// Lets a chat model pick the tool and write the reply.
pub struct OpenAIReasoner {
    client: Client<OpenAIConfig>,
    model: String,
    prompts: AgentPrompts,
}

impl OpenAIReasoner {
    pub fn new(model: &str, prompts: AgentPrompts) -> Result<Self> {
        Ok(Self::with_client(create_client()?, model, prompts))
    }

    /// Use an existing client (e.g. one pointed at a different API base).
    pub fn with_client(client: Client<OpenAIConfig>, model: &str, prompts: AgentPrompts) -> Self {
        Self {
            client,
            model: model.to_string(),
            prompts,
        }
    }

    fn system_prompt(&self, turn: &Turn) -> String {
        match &turn.video_id {
            Some(video_id) => format!(
                "{}\n\n{}",
                self.prompts.system,
                Prompts::render_one(&self.prompts.video_scope, "video_id", video_id)
            ),
            None => self.prompts.system.clone(),
        }
    }

    /// System prompt, thread history and the new user message.
    fn conversation(&self, turn: &Turn) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt(turn))
                .build()
                .map_err(|e| VidchatError::Agent(e.to_string()))?
                .into(),
        ];

        for message in &turn.history {
            let msg: ChatCompletionRequestMessage = match message.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(message.text.clone())
                    .build()
                    .map_err(|e| VidchatError::Agent(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(message.text.clone())
                    .build()
                    .map_err(|e| VidchatError::Agent(e.to_string()))?
                    .into(),
            };
            messages.push(msg);
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(turn.message.clone())
                .build()
                .map_err(|e| VidchatError::Agent(e.to_string()))?
                .into(),
        );

        Ok(messages)
    }

    async fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        tool_choice: ChatCompletionToolChoiceOption,
    ) -> Result<CreateChatCompletionResponse> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .tools(tool_definitions())
            .tool_choice(tool_choice)
            .build()
            .map_err(|e| VidchatError::Agent(e.to_string()))?;

        self.client
            .chat()
            .create(request)
            .await
            .map_err(|e| VidchatError::OpenAI(format!("Chat API error: {}", e)))
    }
}

#[async_trait]
impl Reasoner for OpenAIReasoner {
    #[instrument(skip(self, turn))]
    async fn route(&self, turn: &Turn) -> Result<Route> {
        let response = self
            .complete(self.conversation(turn)?, ChatCompletionToolChoiceOption::Auto)
            .await?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| VidchatError::Agent("No response from model".to_string()))?;

        // Only the first tool call is honoured; one tool per message.
        match choice.message.tool_calls.as_ref().and_then(|calls| calls.first()) {
            Some(call) => {
                info!("Model chose tool {} with args {}", call.function.name, call.function.arguments);
                parse_tool_call(&call.function.name, &call.function.arguments)
            }
            None => {
                debug!("Model answered directly");
                Ok(Route::AnswerDirect {
                    reply: choice.message.content.clone().filter(|c| !c.trim().is_empty()),
                })
            }
        }
    }

    #[instrument(skip(self, turn, observation))]
    async fn respond(&self, turn: &Turn, observation: &Observation) -> Result<String> {
        let mut messages = self.conversation(turn)?;

        let replay = match observation {
            Observation::Direct => None,
            Observation::Retrieved {
                query,
                video_id,
                context,
            } => Some((
                Route::Retrieve {
                    query: query.clone(),
                    video_id: video_id.clone(),
                },
                context.clone(),
            )),
            Observation::Ingested { outcome } => Some((
                Route::Ingest {
                    reference: outcome.video_id.clone(),
                },
                serde_json::to_string(outcome)?,
            )),
        };

        if let Some((route, result)) = replay {
            if let Some((name, arguments)) = tool_call_for(&route) {
                let call = ChatCompletionMessageToolCall {
                    id: TOOL_CALL_ID.to_string(),
                    r#type: ChatCompletionToolType::Function,
                    function: FunctionCall {
                        name: name.to_string(),
                        arguments,
                    },
                };
                messages.push(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .tool_calls(vec![call])
                        .build()
                        .map_err(|e| VidchatError::Agent(e.to_string()))?
                        .into(),
                );
                messages.push(
                    ChatCompletionRequestToolMessageArgs::default()
                        .tool_call_id(TOOL_CALL_ID)
                        .content(result)
                        .build()
                        .map_err(|e| VidchatError::Agent(e.to_string()))?
                        .into(),
                );
            }
        }

        let response = self
            .complete(messages, ChatCompletionToolChoiceOption::None)
            .await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| VidchatError::Agent("Model returned an empty reply".to_string()))
    }
}
