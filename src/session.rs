//! Per-thread conversation state.
//!
//! Sessions live in process memory and are keyed by the client's thread id. A session
//! remembers its messages and the video the thread is currently bound to.

use crate::error::{Result, VidchatError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Position within the session, starting at 1.
    pub id: u64,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Conversation state of one thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub thread_id: String,
    pub messages: Vec<Message>,
    /// Video the thread is bound to, if any.
    pub video_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn new(thread_id: String) -> Self {
        Self {
            thread_id,
            messages: Vec::new(),
            video_id: None,
            created_at: Utc::now(),
        }
    }

    fn push(&mut self, role: Role, text: impl Into<String>) {
        let id = self.messages.last().map_or(1, |m| m.id + 1);
        self.messages.push(Message {
            id,
            role,
            text: text.into(),
            timestamp: Utc::now(),
        });
    }

    /// The last `max` messages, oldest first.
    pub fn recent(&self, max: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(max);
        &self.messages[start..]
    }
}

/// Thread-safe map of sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Session>>> {
        self.sessions
            .read()
            .map_err(|e| VidchatError::Session(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Session>>> {
        self.sessions
            .write()
            .map_err(|e| VidchatError::Session(format!("Failed to acquire lock: {}", e)))
    }

    /// Snapshot of a thread's session, creating an empty one on first use.
    pub fn get_or_create(&self, thread_id: &str) -> Result<Session> {
        if let Some(session) = self.read()?.get(thread_id) {
            return Ok(session.clone());
        }

        let mut sessions = self.write()?;
        let session = sessions
            .entry(thread_id.to_string())
            .or_insert_with(|| {
                debug!("Created session {}", thread_id);
                Session::new(thread_id.to_string())
            });
        Ok(session.clone())
    }

    /// Append one message to a thread.
    pub fn append(&self, thread_id: &str, role: Role, text: &str) -> Result<()> {
        let mut sessions = self.write()?;
        sessions
            .entry(thread_id.to_string())
            .or_insert_with(|| Session::new(thread_id.to_string()))
            .push(role, text);
        Ok(())
    }

    /// Append a user message and the reply to it under one lock.
    pub fn append_turn(&self, thread_id: &str, user_text: &str, reply: &str) -> Result<()> {
        let mut sessions = self.write()?;
        let session = sessions
            .entry(thread_id.to_string())
            .or_insert_with(|| Session::new(thread_id.to_string()));
        session.push(Role::User, user_text);
        session.push(Role::Assistant, reply);
        Ok(())
    }

    /// Record a finished turn on a live thread, binding it to `bound_video` if given.
    ///
    /// Returns `false` and records nothing when the thread was reset while the turn ran.
    pub fn record_turn(
        &self,
        thread_id: &str,
        user_text: &str,
        reply: &str,
        bound_video: Option<&str>,
    ) -> Result<bool> {
        let mut sessions = self.write()?;
        let Some(session) = sessions.get_mut(thread_id) else {
            return Ok(false);
        };

        if let Some(video_id) = bound_video {
            session.video_id = Some(video_id.to_string());
            info!("Thread {} bound to video {}", thread_id, video_id);
        }
        session.push(Role::User, user_text);
        session.push(Role::Assistant, reply);
        Ok(true)
    }

    /// The last `max` messages of a thread.
    pub fn history(&self, thread_id: &str, max: usize) -> Result<Vec<Message>> {
        Ok(self
            .read()?
            .get(thread_id)
            .map(|s| s.recent(max).to_vec())
            .unwrap_or_default())
    }

    /// Bind a thread to a video.
    pub fn bind_video(&self, thread_id: &str, video_id: &str) -> Result<()> {
        let mut sessions = self.write()?;
        sessions
            .entry(thread_id.to_string())
            .or_insert_with(|| Session::new(thread_id.to_string()))
            .video_id = Some(video_id.to_string());
        info!("Thread {} bound to video {}", thread_id, video_id);
        Ok(())
    }

    /// Discard a thread and start a fresh one. Returns the new thread id.
    pub fn reset(&self, thread_id: &str) -> Result<String> {
        let mut sessions = self.write()?;
        sessions.remove(thread_id);

        let base = Utc::now().timestamp_millis().to_string();
        let mut new_id = base.clone();
        let mut suffix = 1;
        while new_id == thread_id || sessions.contains_key(&new_id) {
            new_id = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        sessions.insert(new_id.clone(), Session::new(new_id.clone()));
        info!("Reset thread {} to {}", thread_id, new_id);
        Ok(new_id)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_get_or_create_is_idempotent() {
        let store = SessionStore::new();
        let a = store.get_or_create("1").unwrap();
        let b = store.get_or_create("1").unwrap();
        assert_eq!(a.thread_id, "1");
        assert_eq!(a.created_at, b.created_at);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_message_ids_are_monotonic() {
        let store = SessionStore::new();
        store.append_turn("t", "hi", "hello").unwrap();
        store.append("t", Role::User, "again").unwrap();

        let session = store.get_or_create("t").unwrap();
        let ids: Vec<u64> = session.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(session.messages[1].role, Role::Assistant);
    }

    #[test]
    fn test_threads_do_not_leak() {
        let store = SessionStore::new();
        store.append_turn("a", "secret question", "secret answer").unwrap();
        store.bind_video("a", "abc123").unwrap();

        let b = store.get_or_create("b").unwrap();
        assert!(b.messages.is_empty());
        assert_eq!(b.video_id, None);
        assert!(store.history("b", 10).unwrap().is_empty());
    }

    #[test]
    fn test_history_is_trimmed() {
        let store = SessionStore::new();
        for i in 0..5 {
            store.append_turn("t", &format!("q{}", i), &format!("a{}", i)).unwrap();
        }

        let history = store.history("t", 3).unwrap();
        let texts: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["a3", "q4", "a4"]);
    }

    #[test]
    fn test_reset_returns_distinct_ids() {
        let store = SessionStore::new();
        store.append_turn("old", "q", "a").unwrap();

        let first = store.reset("old").unwrap();
        let second = store.reset("old").unwrap();

        assert_ne!(first, "old");
        assert_ne!(first, second);
        assert!(store.get_or_create(&first).unwrap().messages.is_empty());
        assert!(store.history("old", 10).unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let store = Arc::new(SessionStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..25 {
                        store.append_turn("shared", &format!("{}-{}", i, j), "ok").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let session = store.get_or_create("shared").unwrap();
        assert_eq!(session.messages.len(), 8 * 25 * 2);
        assert!(session.messages.windows(2).all(|w| w[1].id == w[0].id + 1));
    }

    #[test]
    fn test_record_turn_skips_reset_thread() {
        let store = SessionStore::new();
        store.get_or_create("live").unwrap();

        assert!(store.record_turn("live", "q", "a", Some("video_014")).unwrap());
        let session = store.get_or_create("live").unwrap();
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.video_id.as_deref(), Some("video_014"));

        let new_id = store.reset("live").unwrap();
        assert!(!store.record_turn("live", "late q", "late a", Some("video_007")).unwrap());
        assert!(store.history("live", 10).unwrap().is_empty());
        assert!(store.history(&new_id, 10).unwrap().is_empty());
        assert_eq!(store.len(), 1);
    }
}
