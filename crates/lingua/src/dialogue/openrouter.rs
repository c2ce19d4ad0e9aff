use async_trait::async_trait;
use lingua_core::{Assistant, AssistantMetadata, Completion, CoreError, Prompt, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::AiConfig;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat-completions client for OpenRouter and other OpenAI-compatible providers
#[derive(Clone)]
pub struct OpenRouterAssistant {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenRouterAssistant {
    pub fn new(config: &AiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Assistant(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Build from config, taking the key from the configured environment variable
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            CoreError::InvalidConfig(format!("{} is not set", config.api_key_env))
        })?;
        Self::new(config, api_key)
    }

    fn request(&self, prompt: Prompt) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = prompt.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt.message,
        });

        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(prompt.max_tokens.unwrap_or(self.max_tokens)),
            temperature: Some(prompt.temperature.unwrap_or(self.temperature)),
        }
    }
}

/// Text of the first choice; content may be a string or a list of text parts
fn extract_content(response: &serde_json::Value) -> Option<String> {
    let content = response
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))?;

    let text = match content {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(parts) => parts
            .iter()
            .filter(|part| part.get("type").and_then(|t| t.as_str()) == Some("text"))
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join(""),
        _ => return None,
    };

    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[async_trait]
impl Assistant for OpenRouterAssistant {
    async fn complete(&self, prompt: Prompt) -> Result<Completion> {
        let request = self.request(prompt);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CoreError::Assistant(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::Assistant(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CoreError::Assistant(format!("Failed to parse response: {}", e)))?;
        let text = extract_content(&body)
            .ok_or_else(|| CoreError::Assistant("Response has no message content".to_string()))?;

        debug!(model = %self.model, chars = text.len(), "Completion received");
        Ok(Completion {
            text,
            model: Some(self.model.clone()),
            degraded: false,
        })
    }

    fn metadata(&self) -> AssistantMetadata {
        AssistantMetadata {
            name: Some("OpenRouterAssistant".to_string()),
            model: Some(self.model.clone()),
            description: Some(format!("Chat completions at {}", self.base_url)),
        }
    }
}
