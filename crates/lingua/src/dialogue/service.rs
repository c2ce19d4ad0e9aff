use lingua_core::{Assistant, Level, Prompt, SharedAssistant, TemplateAssistant, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use strum_macros::{Display, EnumString};
use tracing::warn;

use super::{DialogueError, DialogueResult};
use crate::config::AiConfig;
use crate::profile::{ProfileError, ProfileRepository};

/// What the learner wants from the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DialogueMode {
    /// Free conversation at the learner's level
    #[default]
    Conversation,
    /// Point out and explain mistakes in the message
    Correction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueReply {
    pub text: String,
    /// The remote assistant was unavailable and a template answered
    pub degraded: bool,
}

#[derive(Debug, Clone)]
pub struct DialogueSettings {
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl From<&AiConfig> for DialogueSettings {
    fn from(config: &AiConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self::from(&AiConfig::default())
    }
}

/// Dialogue practice with a text-completion assistant
#[derive(Clone)]
pub struct DialogueService {
    assistant: SharedAssistant,
    fallback: TemplateAssistant,
    repository: Arc<dyn ProfileRepository>,
    settings: DialogueSettings,
}

impl DialogueService {
    pub fn new(
        assistant: SharedAssistant,
        repository: Arc<dyn ProfileRepository>,
        settings: DialogueSettings,
    ) -> Self {
        Self {
            assistant,
            fallback: TemplateAssistant::default(),
            repository,
            settings,
        }
    }

    /// Replace the template used when the assistant fails or times out
    pub fn with_fallback(mut self, fallback: TemplateAssistant) -> Self {
        self.fallback = fallback;
        self
    }

    /// Reply to a learner message, pitched at the learner's level.
    ///
    /// Never waits longer than the configured timeout; a slow or failing
    /// assistant yields the templated reply with `degraded` set.
    pub async fn reply(
        &self,
        user_id: &UserId,
        message: &str,
        mode: DialogueMode,
    ) -> DialogueResult<DialogueReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(DialogueError::EmptyMessage);
        }

        let profile = self
            .repository
            .load(user_id)
            .await?
            .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))?;

        let prompt = Prompt {
            system: Some(system_prompt(mode, &profile.position.level, &profile.display_name)),
            message: message.to_string(),
            max_tokens: Some(self.settings.max_tokens),
            temperature: Some(self.settings.temperature),
        };

        let failure = match tokio::time::timeout(
            self.settings.timeout,
            self.assistant.complete(prompt.clone()),
        )
        .await
        {
            Ok(Ok(completion)) => {
                return Ok(DialogueReply {
                    text: completion.text,
                    degraded: completion.degraded,
                });
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("no reply within {:?}", self.settings.timeout),
        };

        warn!(user_id = %user_id, reason = %failure, "Dialogue assistant unavailable, using template");
        let completion = self.fallback.complete(prompt).await?;
        Ok(DialogueReply {
            text: completion.text,
            degraded: true,
        })
    }
}

fn system_prompt(mode: DialogueMode, level: &Level, name: &str) -> String {
    let pitch = match level.as_str() {
        "A1" => "Use very short sentences and the most common words.",
        "A2" => "Use simple sentences and everyday vocabulary.",
        _ => "Use natural language a school student can follow.",
    };
    match mode {
        DialogueMode::Conversation => format!(
            "You are a friendly English conversation partner for {}, a school student at CEFR level {}. \
             {} Keep replies under four sentences and end with a question.",
            name, level, pitch
        ),
        DialogueMode::Correction => format!(
            "You are an English teacher. {} is a school student at CEFR level {}. \
             List the mistakes in the student's message, give the corrected sentence, \
             and explain each fix in one line. {}",
            name, level, pitch
        ),
    }
}
