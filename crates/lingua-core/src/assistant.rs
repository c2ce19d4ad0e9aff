//! Assistant trait for AI text completion
//!
//! The curriculum engine never talks to an AI service directly. Dialogue
//! practice goes through this seam so a remote model, a templated fallback,
//! or a test double can be plugged in.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Text-completion collaborator
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Generate a completion for a prompt
    async fn complete(&self, prompt: Prompt) -> Result<Completion>;

    /// Optional method to get assistant metadata
    fn metadata(&self) -> AssistantMetadata {
        AssistantMetadata::default()
    }
}

/// Prompt sent to an assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Instructions framing the conversation
    pub system: Option<String>,
    /// The learner's message
    pub message: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Prompt {
    /// Create a prompt with just a message
    pub fn simple(message: impl Into<String>) -> Self {
        Self {
            system: None,
            message: message.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Generated text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    /// Model that produced the text, when known
    pub model: Option<String>,
    /// The primary assistant failed and a fallback answered
    pub degraded: bool,
}

impl Completion {
    pub fn simple(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
            degraded: false,
        }
    }
}

/// Metadata about an assistant
#[derive(Debug, Clone, Default)]
pub struct AssistantMetadata {
    pub name: Option<String>,
    pub model: Option<String>,
    pub description: Option<String>,
}

/// A boxed assistant for dynamic dispatch
pub type BoxedAssistant = Box<dyn Assistant>;

/// Arc-wrapped assistant for thread-safe sharing
pub type SharedAssistant = Arc<dyn Assistant>;

/// Extension trait for assistant composition
pub trait AssistantExt: Assistant {
    /// Answer with `fallback` whenever this assistant fails
    fn with_fallback<A>(self, fallback: A) -> FallbackAssistant
    where
        Self: Sized + 'static,
        A: Assistant + 'static,
    {
        FallbackAssistant::new(Box::new(self), Box::new(fallback))
    }

    /// Convert to a shared assistant
    fn shared(self) -> SharedAssistant
    where
        Self: Sized + 'static,
    {
        Arc::new(self)
    }
}

impl<T: Assistant> AssistantExt for T {}

/// Tries a primary assistant and degrades to a fallback on error
pub struct FallbackAssistant {
    primary: BoxedAssistant,
    fallback: BoxedAssistant,
}

impl FallbackAssistant {
    pub fn new(primary: BoxedAssistant, fallback: BoxedAssistant) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl Assistant for FallbackAssistant {
    async fn complete(&self, prompt: Prompt) -> Result<Completion> {
        match self.primary.complete(prompt.clone()).await {
            Ok(completion) => Ok(completion),
            Err(e) => {
                tracing::warn!(error = %e, "Assistant failed, using fallback");
                let mut completion = self.fallback.complete(prompt).await?;
                completion.degraded = true;
                Ok(completion)
            }
        }
    }

    fn metadata(&self) -> AssistantMetadata {
        AssistantMetadata {
            name: Some("FallbackAssistant".to_string()),
            description: Some("Primary assistant with a deterministic fallback".to_string()),
            ..self.primary.metadata()
        }
    }
}

/// Deterministic assistant answering from a fixed template.
///
/// `{message}` in the template is replaced with the learner's message.
#[derive(Debug, Clone)]
pub struct TemplateAssistant {
    template: String,
}

impl TemplateAssistant {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Default for TemplateAssistant {
    fn default() -> Self {
        Self::new(
            "I can't reach the conversation partner right now. \
             Try rewriting \"{message}\" in the past tense, then send it again.",
        )
    }
}

#[async_trait]
impl Assistant for TemplateAssistant {
    async fn complete(&self, prompt: Prompt) -> Result<Completion> {
        Ok(Completion::simple(
            self.template.replace("{message}", prompt.message.trim()),
        ))
    }

    fn metadata(&self) -> AssistantMetadata {
        AssistantMetadata {
            name: Some("TemplateAssistant".to_string()),
            description: Some("Templated offline replies".to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreError;

    struct FailingAssistant;

    #[async_trait]
    impl Assistant for FailingAssistant {
        async fn complete(&self, _prompt: Prompt) -> Result<Completion> {
            Err(CoreError::Assistant("timeout".to_string()))
        }
    }

    struct EchoAssistant;

    #[async_trait]
    impl Assistant for EchoAssistant {
        async fn complete(&self, prompt: Prompt) -> Result<Completion> {
            Ok(Completion::simple(prompt.message))
        }
    }

    #[tokio::test]
    async fn test_template_assistant() {
        let assistant = TemplateAssistant::new("You said: {message}");
        let completion = assistant.complete(Prompt::simple(" hello ")).await.unwrap();
        assert_eq!(completion.text, "You said: hello");
        assert!(!completion.degraded);
    }

    #[tokio::test]
    async fn test_fallback_marks_degraded() {
        let assistant = FailingAssistant.with_fallback(TemplateAssistant::new("offline"));
        let completion = assistant.complete(Prompt::simple("hi")).await.unwrap();
        assert_eq!(completion.text, "offline");
        assert!(completion.degraded);
    }

    #[tokio::test]
    async fn test_fallback_prefers_primary() {
        let assistant = EchoAssistant.with_fallback(TemplateAssistant::default());
        let completion = assistant.complete(Prompt::simple("hi")).await.unwrap();
        assert_eq!(completion.text, "hi");
        assert!(!completion.degraded);
    }
}
