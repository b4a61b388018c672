//! YouTube caption transcript provider.
//!
//! Reads the caption track list embedded in the watch page, downloads the timed-text XML
//! for the chosen track and joins its entries into one transcript string.

use super::{TranscriptProvider, VideoDocument};
use crate::error::{Result, VidchatError};
use async_trait::async_trait;
use html_escape::decode_html_entities;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

const DEFAULT_BASE_URL: &str = "https://www.youtube.com";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// One entry of the watch page's `captionTracks` array.
#[derive(Debug, Clone, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode", default)]
    language_code: String,
}

/// Transcript provider that scrapes YouTube captions.
pub struct YoutubeTranscriptProvider {
    client: reqwest::Client,
    base_url: String,
    language: Option<String>,
    text_regex: Regex,
}

impl YoutubeTranscriptProvider {
    /// Create a provider talking to youtube.com.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a provider against a different host (used by tests).
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        let text_regex = Regex::new(r#"(?s)<text[^>]*>(.*?)</text>"#)
            .map_err(|e| VidchatError::Config(format!("Invalid caption regex: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: None,
            text_regex,
        })
    }

    /// Prefer caption tracks in this language (e.g. "en").
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    async fn get_text(&self, url: &str, video_id: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| VidchatError::Fetch(format!("Request for {} failed: {}", video_id, e)))?;

        if !response.status().is_success() {
            return Err(VidchatError::Fetch(format!(
                "YouTube returned {} for {}",
                response.status(),
                video_id
            )));
        }

        response
            .text()
            .await
            .map_err(|e| VidchatError::Fetch(format!("Failed to read response for {}: {}", video_id, e)))
    }

    fn choose_track<'a>(&self, tracks: &'a [CaptionTrack]) -> Option<&'a CaptionTrack> {
        self.language
            .as_deref()
            .and_then(|lang| tracks.iter().find(|t| t.language_code == lang))
            .or_else(|| tracks.first())
    }

    /// Join all caption entries of a timed-text document.
    fn parse_caption_xml(&self, xml: &str) -> Vec<String> {
        self.text_regex
            .captures_iter(xml)
            .filter_map(|caps| caps.get(1))
            .map(|m| decode_entities(m.as_str()).replace('\n', " ").trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeTranscriptProvider {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<VideoDocument> {
        let watch_url = format!("{}/watch?v={}", self.base_url, video_id);
        debug!("Fetching watch page {}", watch_url);
        let page = self.get_text(&watch_url, video_id).await?;

        let tracks = extract_caption_tracks(&page).ok_or_else(|| {
            VidchatError::Fetch(format!(
                "No captions available for {} (captions may be disabled)",
                video_id
            ))
        })?;

        let track = self.choose_track(&tracks).ok_or_else(|| {
            VidchatError::Fetch(format!("No caption tracks listed for {}", video_id))
        })?;

        debug!("Using caption track '{}'", track.language_code);
        let xml = self.get_text(&track.base_url, video_id).await?;
        let lines = self.parse_caption_xml(&xml);

        if lines.is_empty() {
            return Err(VidchatError::Fetch(format!("Empty transcript for {}", video_id)));
        }

        info!("Fetched {} caption lines for {}", lines.len(), video_id);
        Ok(VideoDocument::new(video_id, lines.join(" ")))
    }
}

/// Pull the `captionTracks` array out of the watch page's embedded player response.
fn extract_caption_tracks(page: &str) -> Option<Vec<CaptionTrack>> {
    const MARKER: &str = "\"captionTracks\":";
    let start = page.find(MARKER)? + MARKER.len();

    // The array is followed by more player JSON; read exactly one value.
    serde_json::Deserializer::from_str(&page[start..])
        .into_iter::<Vec<CaptionTrack>>()
        .next()?
        .ok()
        .filter(|tracks| !tracks.is_empty())
}

/// Decode the XML/HTML entities YouTube uses in caption text, including double-escaped ones.
fn decode_entities(text: &str) -> String {
    decode_html_entities(&text.replace("&amp;", "&")).into_owned()
}
