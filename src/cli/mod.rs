//! CLI module for Vidchat.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Vidchat - chat with YouTube videos
///
/// Ingests video transcripts into a vector index and answers questions about them,
/// over HTTP or in the terminal.
#[derive(Parser, Debug)]
#[command(name = "vidchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP chat API
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fetch, chunk and index a video's transcript
    Ingest {
        /// YouTube URL or video ID
        input: String,
    },

    /// Print the transcript context retrieved for a question
    Retrieve {
        /// The question to retrieve context for
        query: String,

        /// Video ID to search in
        #[arg(long)]
        video: String,

        /// Number of chunks to retrieve (defaults to retrieval.top_k)
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Start an interactive chat session
    Chat {
        /// Bind the conversation to a video (URL or ID)
        #[arg(long)]
        video: Option<String>,
    },

    /// Index the bundled demo videos
    Seed,

    /// Re-chunk and re-index cached transcripts without fetching
    Reindex {
        /// Video ID to re-index (use 'all' to re-index every cached transcript)
        video_id: String,
    },

    /// List indexed videos
    List,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "agent.reasoner")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Show configuration file path
    Path,
}
