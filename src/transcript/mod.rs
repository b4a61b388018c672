//! Transcript sources for Vidchat.
//!
//! Resolves user-supplied video references to canonical ids and fetches the matching
//! transcript text through a [`TranscriptProvider`].

mod cache;
mod demo;
mod youtube;

pub use cache::TranscriptCache;
pub use demo::{demo_corpus, DemoVideo};
pub use youtube::YoutubeTranscriptProvider;

use crate::error::{Result, VidchatError};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;
use url::Url;

/// Full transcript of one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDocument {
    /// Stable video identifier.
    pub video_id: String,
    /// Full transcript text.
    pub transcript: String,
}

impl VideoDocument {
    /// Create a new video document.
    pub fn new(video_id: impl Into<String>, transcript: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            transcript: transcript.into(),
        }
    }
}

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the transcript for a canonical video id.
    ///
    /// Fails with [`VidchatError::Fetch`] when the video is unavailable or has no transcript.
    async fn fetch(&self, video_id: &str) -> Result<VideoDocument>;
}

/// Hosts whose URLs carry a YouTube video id.
const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com", "music.youtube.com"];

/// Path prefixes followed by a video id on youtube.com.
const ID_PATH_PREFIXES: &[&str] = &["embed", "shorts", "live", "v"];

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid video id regex"))
}

/// Whether `id` is usable as a video id (and therefore as a cache file name).
pub fn is_valid_video_id(id: &str) -> bool {
    video_id_regex().is_match(id)
}

/// Resolve a YouTube URL or bare id to its canonical video id.
///
/// Accepts `youtube.com/watch?v=ID`, `youtu.be/ID`, `youtube.com/{embed,shorts,live,v}/ID`
/// (scheme optional) and bare ids.
pub fn parse_video_reference(input: &str) -> Result<String> {
    let input = input.trim();
    let invalid = || VidchatError::InvalidReference(input.to_string());

    if input.is_empty() {
        return Err(invalid());
    }

    let looks_like_url = input.contains("://") || input.contains("youtube.com") || input.contains("youtu.be");
    if !looks_like_url {
        return if is_valid_video_id(input) {
            Ok(input.to_string())
        } else {
            Err(invalid())
        };
    }

    let url = if input.contains("://") {
        Url::parse(input)
    } else {
        Url::parse(&format!("https://{}", input))
    }
    .map_err(|_| invalid())?;

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let mut segments = url.path_segments().into_iter().flatten().filter(|s| !s.is_empty());

    let candidate = if host == "youtu.be" {
        segments.next().map(str::to_string)
    } else if YOUTUBE_HOSTS.contains(&host.as_str()) {
        match url.query_pairs().find(|(k, _)| k == "v") {
            Some((_, v)) => Some(v.into_owned()),
            None => match (segments.next(), segments.next()) {
                (Some(prefix), Some(id)) if ID_PATH_PREFIXES.contains(&prefix) => Some(id.to_string()),
                _ => None,
            },
        }
    } else {
        None
    };

    candidate
        .filter(|id| is_valid_video_id(id))
        .ok_or_else(invalid)
}

/// Provider backed by an in-memory map of transcripts.
///
/// Used for the bundled demo corpus and for offline runs.
#[derive(Debug, Default, Clone)]
pub struct StaticTranscriptProvider {
    documents: HashMap<String, String>,
}

impl StaticTranscriptProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider serving the given documents.
    pub fn from_documents(documents: impl IntoIterator<Item = VideoDocument>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|d| (d.video_id, d.transcript))
                .collect(),
        }
    }

    /// Create a provider serving the demo corpus.
    pub fn demo() -> Self {
        Self::from_documents(demo_corpus().into_iter().map(|v| v.document()))
    }

    /// Add or replace a transcript.
    pub fn insert(&mut self, video_id: impl Into<String>, transcript: impl Into<String>) {
        self.documents.insert(video_id.into(), transcript.into());
    }
}

#[async_trait]
impl TranscriptProvider for StaticTranscriptProvider {
    async fn fetch(&self, video_id: &str) -> Result<VideoDocument> {
        match self.documents.get(video_id) {
            Some(text) if !text.trim().is_empty() => Ok(VideoDocument::new(video_id, text.trim())),
            Some(_) => Err(VidchatError::Fetch(format!("Empty transcript for {}", video_id))),
            None => Err(VidchatError::Fetch(format!("No transcript available for {}", video_id))),
        }
    }
}
