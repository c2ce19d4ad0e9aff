//! # Lingua Core Engine
//!
//! Adaptive curriculum engine: catalog, placement scoring, progress
//! tracking, retry buffer, and the event/action types exchanged with
//! transports.

pub mod answer;
pub mod assistant;
pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod level;
pub mod placement;
pub mod profile;
pub mod progress;
pub mod retry;
pub mod summary;

pub use answer::AnswerRule;
pub use assistant::{
    Assistant, AssistantExt, AssistantMetadata, Completion, FallbackAssistant, Prompt,
    SharedAssistant, TemplateAssistant,
};
pub use catalog::{Catalog, CurriculumModule, Exercise, ExerciseRef, PlacementQuestion};
pub use config::{EngineConfig, EvictionPolicy, PlacementBand};
pub use error::{CoreError, Result};
pub use event::{
    AnswerFeedback, EventId, EventType, ExercisePrompt, InboundEvent, LevelComplete, NextAction,
    Outcome, PlacementPrompt,
};
pub use level::Level;
pub use placement::{PlacementEvaluator, PlacementResult};
pub use profile::{ModulePass, Position, Stage, Tally, UserId, UserProfile};
pub use progress::{AnswerOutcome, ModuleCompletion, ModuleDecision, ProgressTracker, Progression};
pub use retry::{RetryBuffer, RetryBufferManager, RetryEntry};
pub use summary::{ModuleSummary, summarize};
