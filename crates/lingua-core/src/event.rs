//! Inbound events and outbound actions exchanged with transports

use crate::{ExerciseRef, Level, ModuleSummary, PlacementResult, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};

/// NewType pattern for Event ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(String);

impl EventId {
    /// Create a new EventId
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Create from existing string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    Start,
    PlacementAnswer,
    ExerciseAnswer,
}

/// Event received from a transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    #[serde(default)]
    pub id: EventId,
    pub user_id: UserId,
    pub event_type: EventType,
    #[serde(default)]
    pub payload: String,
}

impl InboundEvent {
    pub fn start(user_id: UserId) -> Self {
        Self {
            id: EventId::new(),
            user_id,
            event_type: EventType::Start,
            payload: String::new(),
        }
    }

    pub fn answer(user_id: UserId, event_type: EventType, payload: impl Into<String>) -> Self {
        Self {
            id: EventId::new(),
            user_id,
            event_type,
            payload: payload.into(),
        }
    }
}

/// A placement question ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementPrompt {
    pub question_id: String,
    /// 1-based question number
    pub number: usize,
    pub total: usize,
    pub prompt: String,
    pub options: Vec<String>,
}

/// An exercise ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePrompt {
    pub exercise: ExerciseRef,
    pub module_title: String,
    pub exercises_per_module: u8,
    pub prompt: String,
    pub options: Vec<String>,
    /// Served from the retry buffer rather than the curriculum
    pub is_retry: bool,
    /// Misses so far, for retry items
    pub misses: u32,
}

/// Terminal progression state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelComplete {
    pub level: Level,
    pub vocabulary_size: usize,
    /// Items waiting in the retry buffer for a review session
    pub review_available: usize,
    /// Summary of the module that finished the curriculum, if just finished
    pub final_summary: Option<ModuleSummary>,
}

/// Outbound action for the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NextAction {
    AskPlacementQuestion(PlacementPrompt),
    PresentExercise(ExercisePrompt),
    ShowModuleSummary(ModuleSummary),
    ShowLevelComplete(LevelComplete),
}

/// Feedback on a graded answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerFeedback {
    pub correct: bool,
    /// Accepted answers; shown after a miss
    pub expected: Vec<String>,
    pub is_retry: bool,
}

/// Result of an answer submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Present for exercise answers; placement answers are not revealed
    pub feedback: Option<AnswerFeedback>,
    /// Present when the answer finished the placement test
    pub placement: Option<PlacementResult>,
    pub action: NextAction,
}
