//! Keyword-based reasoner that needs no language model.

use super::{Observation, Reasoner, Route, Turn};
use crate::config::{Prompts, ReplyTemplates};
use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

const GREETINGS: &[&str] = &[
    "hello", "hi", "hey", "hiya", "howdy", "yo", "good morning", "good afternoon", "good evening",
    "thanks", "thank you", "bye", "goodbye",
];

const META_QUESTIONS: &[&str] = &[
    "who are you",
    "what are you",
    "what can you do",
    "how are you",
    "how do you work",
    "help",
];

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:https?://)?(?:[a-z]+\.)?(?:youtube\.com|youtu\.be)/\S+").expect("valid url regex")
    })
}

fn command_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:please\s+)?(?:add|ingest|index|load|watch)\s+(?:the\s+)?video\s+([A-Za-z0-9_-]+)\W*$")
            .expect("valid command regex")
    })
}

/// Exact phrase, or the phrase followed by at most two more words ("hi there").
fn matches_phrase(normalized: &str, phrase: &str) -> bool {
    normalized == phrase
        || normalized
            .strip_prefix(phrase)
            .is_some_and(|rest| rest.starts_with(' ') && rest.split_whitespace().count() <= 2)
}

/// Routes by keywords and answers from reply templates.
pub struct RuleReasoner {
    replies: ReplyTemplates,
}

impl RuleReasoner {
    pub fn new(replies: ReplyTemplates) -> Self {
        Self { replies }
    }

    /// Lowercase with surrounding punctuation and whitespace removed.
    fn normalize(message: &str) -> String {
        message
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    fn is_greeting(normalized: &str) -> bool {
        GREETINGS.iter().any(|g| matches_phrase(normalized, g))
    }

    fn is_meta(normalized: &str) -> bool {
        META_QUESTIONS.iter().any(|q| matches_phrase(normalized, q))
    }

    fn video_reference(message: &str) -> Option<String> {
        if let Some(m) = url_regex().find(message) {
            let url = m.as_str().trim_end_matches(|c: char| matches!(c, '.' | ',' | ')' | '!' | '?'));
            return Some(url.to_string());
        }
        command_regex()
            .captures(message.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl Default for RuleReasoner {
    fn default() -> Self {
        Self::new(ReplyTemplates::default())
    }
}

#[async_trait]
impl Reasoner for RuleReasoner {
    async fn route(&self, turn: &Turn) -> Result<Route> {
        if let Some(reference) = Self::video_reference(&turn.message) {
            return Ok(Route::Ingest { reference });
        }

        let normalized = Self::normalize(&turn.message);
        if normalized.is_empty() || Self::is_greeting(&normalized) {
            return Ok(Route::AnswerDirect {
                reply: Some(self.replies.greeting.clone()),
            });
        }
        if Self::is_meta(&normalized) {
            return Ok(Route::AnswerDirect {
                reply: Some(self.replies.about.clone()),
            });
        }

        Ok(Route::Retrieve {
            query: turn.message.trim().to_string(),
            video_id: turn.video_id.clone(),
        })
    }

    async fn respond(&self, _turn: &Turn, observation: &Observation) -> Result<String> {
        let reply = match observation {
            Observation::Direct => self.replies.greeting.clone(),
            Observation::Retrieved { context, .. } if context.trim().is_empty() => self.replies.no_context.clone(),
            Observation::Retrieved { context, .. } => Prompts::render_one(&self.replies.grounded, "context", context),
            Observation::Ingested { outcome } => {
                let mut vars = HashMap::new();
                vars.insert("video_id".to_string(), outcome.video_id.clone());
                vars.insert("chunks".to_string(), outcome.chunks_indexed.to_string());
                Prompts::render(&self.replies.ingested, &vars)
            }
        };
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::IngestOutcome;

    async fn route(message: &str) -> Route {
        RuleReasoner::default()
            .route(&Turn::new(message).with_video(Some("abc123".to_string())))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_greetings_answer_directly() {
        for message in ["hello", "Hello!", "hi there", "Good morning", "thanks a lot", "  "] {
            assert!(
                matches!(route(message).await, Route::AnswerDirect { reply: Some(_) }),
                "expected direct answer for {:?}",
                message
            );
        }
    }

    #[tokio::test]
    async fn test_meta_questions_answer_directly() {
        let route = route("Who are you?").await;
        assert_eq!(
            route,
            Route::AnswerDirect {
                reply: Some(ReplyTemplates::default().about)
            }
        );
    }

    #[tokio::test]
    async fn test_urls_are_ingested() {
        assert_eq!(
            route("Can you look at https://www.youtube.com/watch?v=abc123.").await,
            Route::Ingest {
                reference: "https://www.youtube.com/watch?v=abc123".to_string()
            }
        );
        assert_eq!(
            route("youtu.be/dQw4w9WgXcQ").await,
            Route::Ingest {
                reference: "youtu.be/dQw4w9WgXcQ".to_string()
            }
        );
        assert_eq!(
            route("please add video video_014").await,
            Route::Ingest {
                reference: "video_014".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_questions_are_retrieved() {
        assert_eq!(
            route("What are Chronoc beans?").await,
            Route::Retrieve {
                query: "What are Chronoc beans?".to_string(),
                video_id: Some("abc123".to_string()),
            }
        );
        // Greeting words inside a real question do not short-circuit retrieval.
        assert!(matches!(
            route("hi, what does the video say about Zarnok clouds?").await,
            Route::Retrieve { .. }
        ));
    }

    #[tokio::test]
    async fn test_respond_templates() {
        let reasoner = RuleReasoner::default();
        let turn = Turn::new("q");

        let empty = reasoner
            .respond(&turn, &Observation::Retrieved {
                    query: "q".to_string(),
                    video_id: None,
                    context: String::new(),
                })
            .await
            .unwrap();
        assert_eq!(empty, ReplyTemplates::default().no_context);

        let grounded = reasoner
            .respond(
                &turn,
                &Observation::Retrieved {
                    query: "q".to_string(),
                    video_id: None,
                    context: "Chronoc beans grow backwards.".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(grounded.contains("Chronoc beans grow backwards."));

        let outcome = IngestOutcome {
            video_id: "abc123".to_string(),
            chunks_indexed: 4,
            replaced: 0,
            cache_error: None,
        };
        let ack = reasoner.respond(&turn, &Observation::Ingested { outcome }).await.unwrap();
        assert!(ack.contains("abc123"));
        assert!(ack.contains("4 chunks"));
    }
}
