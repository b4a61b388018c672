//! Configuration module for Vidchat.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, Prompts, ReplyTemplates};
pub use settings::{
    AgentSettings, ChunkingSettings, EmbeddingProvider, EmbeddingSettings, GeneralSettings,
    IngestSettings, PromptSettings, ReasonerKind, RetrievalSettings, ServerSettings, Settings,
    VectorStoreProvider, VectorStoreSettings,
};
