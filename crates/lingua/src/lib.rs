//! Main crate for the Lingua adaptive English-learning engine
//!
//! Application layer over `lingua-core`: profile persistence, the adaptive
//! dispatcher that runs learner sessions, and AI dialogue practice.

pub mod app;
pub mod config;
pub mod dialogue;
pub mod dispatcher;
pub mod error;
pub mod profile;
pub mod sample;
pub mod storage;

// Re-export core types
pub use lingua_core::{
    AnswerFeedback, Catalog, CoreError, EngineConfig, EventType, ExercisePrompt, InboundEvent,
    LevelComplete, ModuleSummary, NextAction, Outcome, PlacementPrompt, PlacementResult, Stage,
    UserId, UserProfile,
};

// Re-export app types
pub use app::{AppMetadata, LinguaApp, LinguaAppBuilder};
pub use config::{AiConfig, LinguaConfig};
pub use dialogue::{DialogueMode, DialogueReply, DialogueService};
pub use dispatcher::{AdaptiveDispatcher, ProgressReport};
pub use profile::ProfileRepository;

// Re-export error types
pub use error::{LinguaError, Result as LinguaResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::app::LinguaApp;
    pub use crate::config::LinguaConfig;
    pub use crate::dispatcher::AdaptiveDispatcher;
    pub use lingua_core::{InboundEvent, NextAction, Outcome, UserId};
}
