//! Vidchat - chat with YouTube videos
//!
//! A retrieval-augmented chat backend over YouTube transcripts.
//!
//! # Overview
//!
//! Vidchat lets you:
//! - Ingest a video's transcript by URL or ID, chunk it and index it
//! - Ask questions scoped to one video and get answers grounded in its transcript
//! - Keep per-thread conversations over a small HTTP API
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `transcript` - Transcript fetching, parsing of video references, and the on-disk cache
//! - `chunking` - Recursive character splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector storage and the embedding-aware index
//! - `ingest` - Fetch, cache, chunk and index pipeline
//! - `rag` - Video-scoped retrieval
//! - `agent` - Routing between direct answers, retrieval and ingestion
//! - `session` - Per-thread conversation state
//! - `chat` - Turn handling with timeouts and history
//! - `server` - HTTP endpoints
//! - `orchestrator` - Component wiring
//!
//! # Example
//!
//! ```rust,no_run
//! use vidchat::config::Settings;
//! use vidchat::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let chat = orchestrator.chat();
//!     chat.generate("https://www.youtube.com/watch?v=dQw4w9WgXcQ", None, "1").await?;
//!     let reply = chat.generate("What is this video about?", None, "1").await?;
//!     println!("{}", reply);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod chat;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod server;
pub mod session;
pub mod transcript;
pub mod vector_store;

pub use error::{Result, VidchatError};
