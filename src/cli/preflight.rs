//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting operations that
//! would otherwise fail midway.

use crate::config::{EmbeddingProvider, Settings};
use crate::error::{Result, VidchatError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Ingesting and retrieving need the embedder.
    Index,
    /// Chatting needs the embedder and the reasoner.
    Chat,
    /// Listing only reads the vector store.
    List,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    let needs_key = match operation {
        Operation::Index => settings.embedding.provider == EmbeddingProvider::OpenAI,
        Operation::Chat => settings.uses_openai(),
        Operation::List => false,
    };
    if needs_key {
        check_api_key()?;
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(VidchatError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(VidchatError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...' \
             or switch to embedding.provider = \"hashing\" and agent.reasoner = \"rules\""
                .to_string(),
        )),
    }
}
