//! Transcript chunking for indexing.
//!
//! Transcripts are split into overlapping, bounded-length pieces so that no sentence is
//! lost at a split point.

mod splitter;

pub use splitter::{Splits, TextSplitter};

use serde::{Deserialize, Serialize};

/// A slice of one video's transcript, the unit of embedding and indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content of this chunk.
    pub content: String,
    /// Video this chunk was cut from.
    pub video_id: String,
    /// Position of this chunk within the transcript.
    pub order: usize,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(content: String, video_id: String, order: usize) -> Self {
        Self {
            content,
            video_id,
            order,
        }
    }

    /// Length of the content in chars.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}
