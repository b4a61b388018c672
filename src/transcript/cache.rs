//! JSON transcript cache.
//!
//! One pretty-printed `<video_id>.json` file per fetched video, shaped
//! `{ "video_id": ..., "transcript": ... }`.

use super::{is_valid_video_id, VideoDocument};
use crate::error::{Result, VidchatError};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Durable store of fetched transcripts keyed by video id.
#[derive(Debug, Clone)]
pub struct TranscriptCache {
    dir: PathBuf,
}

impl TranscriptCache {
    /// Create a cache rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a video's cached transcript.
    pub fn path_for(&self, video_id: &str) -> Result<PathBuf> {
        if !is_valid_video_id(video_id) {
            return Err(VidchatError::InvalidReference(video_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", video_id)))
    }

    /// Write a transcript, replacing any previous copy.
    #[instrument(skip(self, doc), fields(video_id = %doc.video_id))]
    pub async fn save(&self, doc: &VideoDocument) -> Result<PathBuf> {
        let path = self.path_for(&doc.video_id)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let json = serde_json::to_string_pretty(doc)?;
        tokio::fs::write(&path, json).await?;

        debug!("Cached transcript at {:?}", path);
        Ok(path)
    }

    /// Read a cached transcript, if present.
    pub async fn load(&self, video_id: &str) -> Result<Option<VideoDocument>> {
        let path = self.path_for(video_id)?;

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let doc: VideoDocument = serde_json::from_str(&content)?;
        Ok(Some(doc))
    }

    /// List ids of all cached transcripts, sorted.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_valid_video_id(stem) {
                    ids.push(stem.to_string());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TranscriptCache::new(dir.path().join("data"));

        let doc = VideoDocument::new("abc123", "Chronoc beans grow only during reverse time cycles.");
        let path = cache.save(&doc).await.unwrap();
        assert!(path.ends_with("abc123.json"));

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["video_id"], "abc123");
        assert_eq!(value["transcript"], doc.transcript);

        assert_eq!(cache.load("abc123").await.unwrap(), Some(doc));
        assert_eq!(cache.load("missing").await.unwrap(), None);
        assert_eq!(cache.list().await.unwrap(), vec!["abc123".to_string()]);
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TranscriptCache::new(dir.path().join("nope"));
        assert!(cache.list().await.unwrap().is_empty());
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let cache = TranscriptCache::new("data");
        assert!(cache.path_for("../secrets").is_err());
        assert!(cache.path_for("abc123").is_ok());
    }
}
