//! Prompt and reply templates for Vidchat.
//!
//! Templates use `{{name}}` placeholders filled by [`Prompts::render`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    pub replies: ReplyTemplates,
}

/// Prompts for the language-model reasoner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
    /// Appended to the system prompt when the thread is bound to a video.
    pub video_scope: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful AI assistant that can answer questions about specific YouTube videos.

- If the user asks a question about the video's content, use the "retrieve" tool to find the answer in the transcript.
- If the user provides a new YouTube URL, use the "ingest_video" tool to process it.
- For simple greetings or general conversation (like "hello", "how are you?", "who are you?"), answer directly without using any tools.
- Answer only from retrieved transcript text. If the retrieved text is empty or does not cover the question, say that you don't know instead of guessing."#
                .to_string(),
            video_scope: "The current video_id is {{video_id}}. Pass it to the \"retrieve\" tool.".to_string(),
        }
    }
}

/// Reply templates used by the rule-based reasoner and the router.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyTemplates {
    pub greeting: String,
    pub about: String,
    pub ingested: String,
    pub grounded: String,
    pub no_context: String,
    pub needs_video: String,
}

impl Default for ReplyTemplates {
    fn default() -> Self {
        Self {
            greeting: "Hello! Send me a YouTube link and ask me anything about the video.".to_string(),
            about: "I'm an assistant that answers questions about YouTube videos using their transcripts. \
                    Share a link to add a video, then ask away."
                .to_string(),
            ingested: "Done! Video {{video_id}} is indexed ({{chunks}} chunks). What would you like to know about it?"
                .to_string(),
            grounded: "Here's what the transcript says:\n\n{{context}}".to_string(),
            no_context: "I couldn't find anything about that in this video's transcript, so I'm not sure.".to_string(),
            needs_video: "Which video should I look at? Share a YouTube link first.".to_string(),
        }
    }
}

impl Prompts {
    /// Build prompts, replacing the system prompt when one is configured.
    pub fn with_system_override(system: Option<&str>) -> Self {
        let mut prompts = Prompts::default();
        if let Some(system) = system.filter(|s| !s.trim().is_empty()) {
            prompts.agent.system = system.to_string();
        }
        prompts
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a template with a single variable.
    pub fn render_one(template: &str, key: &str, value: &str) -> String {
        template.replace(&format!("{{{{{}}}}}", key), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.agent.system.contains("retrieve"));
        assert!(prompts.agent.system.contains("ingest_video"));
        assert!(prompts.replies.ingested.contains("{{video_id}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Video {{video_id}} has {{chunks}} chunks.";
        let mut vars = HashMap::new();
        vars.insert("video_id".to_string(), "abc123".to_string());
        vars.insert("chunks".to_string(), "4".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Video abc123 has 4 chunks.");
    }

    #[test]
    fn test_system_override() {
        let prompts = Prompts::with_system_override(Some("Be terse."));
        assert_eq!(prompts.agent.system, "Be terse.");

        let prompts = Prompts::with_system_override(Some("   "));
        assert!(prompts.agent.system.contains("YouTube"));
    }
}
