use chrono::{DateTime, Utc};
use lingua_core::{EngineConfig, Level, Stage, Tally, UserId, UserProfile};
use serde::{Deserialize, Serialize};

/// Read-only snapshot of a learner's progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub user_id: UserId,
    pub display_name: String,
    pub grade: Option<u8>,
    pub stage: Stage,
    pub level: Level,
    pub module: u8,
    pub exercise: u8,
    pub modules_per_level: u8,
    /// Answers given so far in the placement test
    pub placement_answered: usize,
    pub current_pass: Tally,
    pub lifetime: Tally,
    /// Lifetime correct/total
    pub overall_mastery: f64,
    pub modules_attempted: usize,
    pub vocabulary_size: usize,
    pub retry_buffer_size: usize,
    pub retry_emphasis: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressReport {
    pub fn from_profile(profile: &UserProfile, config: &EngineConfig) -> Self {
        let lifetime = profile.lifetime_tally();
        Self {
            user_id: profile.user_id.clone(),
            display_name: profile.display_name.clone(),
            grade: profile.grade,
            stage: profile.stage,
            level: profile.position.level.clone(),
            module: profile.position.module,
            exercise: profile.position.exercise,
            modules_per_level: config.modules_per_level,
            placement_answered: profile.placement_answers.len(),
            current_pass: profile.current_pass.tally,
            overall_mastery: lifetime.ratio(),
            lifetime,
            modules_attempted: profile.module_history.len(),
            vocabulary_size: profile.vocabulary.len(),
            retry_buffer_size: profile.retry_buffer.len(),
            retry_emphasis: profile.retry_emphasis,
            completed_at: profile.completed_at,
        }
    }
}
