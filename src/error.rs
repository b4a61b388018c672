//! Error types for Vidchat.

use thiserror::Error;

/// Library-level error type for Vidchat operations.
#[derive(Error, Debug)]
pub enum VidchatError {
    #[error("Invalid video reference: {0}")]
    InvalidReference(String),

    #[error("Transcript fetch failed: {0}")]
    Fetch(String),

    #[error("Retrieval requires a video_id scope")]
    MissingScope,

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl VidchatError {
    /// A sentence that is safe to show to chat users.
    ///
    /// Never includes the wrapped detail text, which may carry URLs, SQL or provider payloads.
    pub fn user_message(&self) -> &'static str {
        match self {
            VidchatError::InvalidReference(_) => {
                "That doesn't look like a YouTube link or video ID I can read. Please check it and try again."
            }
            VidchatError::Fetch(_) => {
                "I couldn't get a transcript for that video. It may not exist, or its captions may be disabled."
            }
            VidchatError::MissingScope => {
                "Which video should I look at? Share a YouTube link or pick a video first."
            }
            VidchatError::Index(_) | VidchatError::Embedding(_) | VidchatError::Database(_) => {
                "I had trouble searching the video library just now. Please try again in a moment."
            }
            VidchatError::Timeout(_) => "That took too long to answer. Please try again.",
            _ => "Sorry, something went wrong while answering. Please try again.",
        }
    }
}

/// Result type alias for Vidchat operations.
pub type Result<T> = std::result::Result<T, VidchatError>;
