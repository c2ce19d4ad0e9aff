//! AI conversation practice

pub mod error;
pub mod openrouter;
pub mod service;

pub use error::{DialogueError, DialogueResult};
pub use openrouter::OpenRouterAssistant;
pub use service::{DialogueMode, DialogueReply, DialogueService, DialogueSettings};
