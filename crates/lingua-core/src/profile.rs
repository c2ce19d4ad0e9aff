//! Per-user learner state

use crate::{ExerciseRef, Level, RetryBuffer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use strum_macros::{Display, EnumString};

/// NewType pattern for User ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create from existing string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Top-level learner state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    /// Taking the placement test
    Placement,
    /// Working through the curriculum
    Learning,
    /// Finished the top level
    Complete,
}

/// Correct/incorrect counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u32,
    pub incorrect: u32,
}

impl Tally {
    pub fn record(&mut self, correct: bool) {
        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.correct + self.incorrect
    }

    /// correct / total, 0.0 when nothing was answered
    pub fn ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => f64::from(self.correct) / f64::from(total),
        }
    }

    pub fn merge(&mut self, other: &Tally) {
        self.correct += other.correct;
        self.incorrect += other.incorrect;
    }
}

/// Statistics for one pass through the current module
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModulePass {
    pub tally: Tally,
    /// Per-skill counters for the pass
    pub skills: BTreeMap<String, Tally>,
    /// Words first learned during the pass
    pub new_vocabulary: BTreeSet<String>,
}

/// Curriculum pointer; module and exercise numbers are 1-based
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub level: Level,
    pub module: u8,
    pub exercise: u8,
}

impl Position {
    pub fn start_of(level: Level, module: u8) -> Self {
        Self {
            level,
            module,
            exercise: 1,
        }
    }

    /// Key used for historical per-module counters
    pub fn module_key(&self) -> String {
        module_key(&self.level, self.module)
    }
}

/// Key used for historical per-module counters, e.g. `A1/03`
pub fn module_key(level: &Level, module: u8) -> String {
    format!("{}/{:02}", level, module)
}

/// Persistent learner record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub display_name: String,
    /// School grade, when the learner gave one
    #[serde(default)]
    pub grade: Option<u8>,
    pub stage: Stage,
    pub position: Position,
    pub current_pass: ModulePass,
    /// Lifetime counters per module, keyed by [`module_key`]
    pub module_history: BTreeMap<String, Tally>,
    pub vocabulary: BTreeSet<String>,
    pub retry_buffer: RetryBuffer,
    /// Retry items still queued for the running session
    #[serde(default)]
    pub session_queue: VecDeque<ExerciseRef>,
    /// Set after remediation; doubles retry items per session
    #[serde(default)]
    pub retry_emphasis: bool,
    /// Answers given so far in the placement test
    #[serde(default)]
    pub placement_answers: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub placed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Create a profile at the start of the placement test
    pub fn new(user_id: UserId, display_name: impl Into<String>, start_level: Level) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            display_name: display_name.into(),
            grade: None,
            stage: Stage::Placement,
            position: Position::start_of(start_level, 1),
            current_pass: ModulePass::default(),
            module_history: BTreeMap::new(),
            vocabulary: BTreeSet::new(),
            retry_buffer: RetryBuffer::new(),
            session_queue: VecDeque::new(),
            retry_emphasis: false,
            placement_answers: Vec::new(),
            created_at: now,
            updated_at: now,
            placed_at: None,
            completed_at: None,
        }
    }

    /// Mastery ratio of the current module pass
    pub fn mastery_ratio(&self) -> f64 {
        self.current_pass.tally.ratio()
    }

    /// Counters summed over every module ever attempted
    pub fn lifetime_tally(&self) -> Tally {
        self.module_history
            .values()
            .fold(Tally::default(), |mut acc, t| {
                acc.merge(t);
                acc
            })
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
