//! Reply generation via the Claude API

use std::future::Future;

use anyhow::{Context, Result};
use minecraft_types::{DayPhase, PlayerSnapshot};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AiConfig;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly AI companion playing on a Minecraft \
    survival server. Keep replies short (one or two sentences), casual, and in plain text \
    with no formatting. You chat with players in the server's public chat.";

/// World state passed along with every generation call
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyContext {
    pub health: f32,
    pub food: u32,
    pub phase: Option<DayPhase>,
    pub online: u32,
    /// Set for whisper conversations
    pub is_private: bool,
}

impl ReplyContext {
    pub fn from_snapshot(snapshot: &PlayerSnapshot) -> Self {
        Self {
            health: snapshot.health,
            food: snapshot.food,
            phase: snapshot.phase,
            online: snapshot.online,
            is_private: false,
        }
    }

    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }

    fn describe(&self) -> String {
        format!(
            "[World context] health: {}/20, food: {}/20, time: {}, players online: {}{}",
            self.health,
            self.food,
            self.phase.map(|p| p.label()).unwrap_or("unknown"),
            self.online,
            if self.is_private {
                ", private conversation"
            } else {
                ""
            }
        )
    }
}

/// The external generation call. Failures and empty results both mean
/// "no reply".
pub trait ReplyGenerator: Send + Sync {
    fn generate(
        &self,
        sender: &str,
        message: &str,
        context: &ReplyContext,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Claude API client
#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    config: AiConfig,
}

impl ClaudeClient {
    pub fn new(config: AiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn request_reply(&self, sender: &str, message: &str, context: &ReplyContext) -> Result<String> {
        let user_content = format!("{}\n\n{} says: {}", context.describe(), sender, message);

        let request = ClaudeRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: user_content,
            }],
        };

        debug!("Requesting reply from Claude for {}", sender);

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Claude API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Claude API error: {} - {}", status, error_text);
        }

        let body: ClaudeResponse = response
            .json()
            .await
            .context("Failed to parse Claude API response")?;

        let text = body
            .content
            .into_iter()
            .find_map(|block| {
                if block.block_type == "text" {
                    block.text
                } else {
                    None
                }
            })
            .unwrap_or_default();

        debug!("Claude returned {} chars", text.len());
        Ok(text)
    }
}

impl ReplyGenerator for ClaudeClient {
    async fn generate(
        &self,
        sender: &str,
        message: &str,
        context: &ReplyContext,
    ) -> Result<String> {
        self.request_reply(sender, message, context).await
    }
}

/// Message in a Claude conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_describe_includes_gauges() {
        let mut snapshot = PlayerSnapshot::default();
        snapshot.health = 12.0;
        snapshot.food = 7;
        snapshot.phase = Some(DayPhase::Night);
        snapshot.online = 4;

        let described = ReplyContext::from_snapshot(&snapshot).describe();
        assert!(described.contains("12/20"));
        assert!(described.contains("7/20"));
        assert!(described.contains("night"));
        assert!(described.contains("players online: 4"));
        assert!(!described.contains("private"));
    }

    #[test]
    fn test_private_context_is_marked() {
        let snapshot = PlayerSnapshot::default();
        let described = ReplyContext::from_snapshot(&snapshot).private().describe();
        assert!(described.contains("private conversation"));
    }

    #[test]
    fn test_response_content_parses() {
        let json = r#"{"content":[{"type":"text","text":"hello there"}]}"#;
        let parsed: ClaudeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.content[0].block_type, "text");
        assert_eq!(parsed.content[0].text.as_deref(), Some("hello there"));
    }
}
