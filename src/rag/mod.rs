//! Retrieval for grounding chat replies in a video's transcript.
//!
//! Every retrieval is scoped to exactly one video. The result is a single string that is
//! handed to the reasoner as tool output.

mod retriever;

pub use retriever::{Retriever, DEFAULT_TOP_K};
