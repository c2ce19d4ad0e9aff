//! Progress tracking and module/level navigation
//!
//! The tracker mutates a [`UserProfile`] in place. Callers hand it a working
//! copy and only commit the copy once it is persisted, so a failed step
//! never leaves a half-applied transition behind.

use crate::{
    CoreError, EngineConfig, Exercise, ExerciseRef, Level, ModulePass, Position, Result,
    RetryBufferManager, RetryEntry, Stage, Tally, UserProfile,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::{debug, info};

/// Module-end decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModuleDecision {
    /// Mastery at or above the excellent threshold
    FastTrack,
    /// Ordinary advancement
    Advance,
    /// Mastery at or below the error threshold; the module is repeated
    Remediate,
}

/// Where the learner ended up after a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Progression {
    /// Same module again
    Repeat { level: Level, module: u8 },
    /// Another module of the same level
    Module { level: Level, module: u8 },
    /// First module of the next level
    LevelUp { from: Level, to: Level },
    /// Top level finished
    Complete { level: Level },
}

/// A finished module pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleCompletion {
    pub level: Level,
    pub module: u8,
    pub pass: ModulePass,
    pub decision: ModuleDecision,
    pub progression: Progression,
}

/// Result of grading one answer
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub exercise: ExerciseRef,
    pub correct: bool,
    /// Entries dropped from the retry buffer by this answer
    pub evicted: Vec<RetryEntry>,
    pub completion: Option<ModuleCompletion>,
}

/// Grades answers, updates counters and moves the curriculum pointer
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    config: EngineConfig,
    retry: RetryBufferManager,
}

impl ProgressTracker {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
            retry: RetryBufferManager::new(config),
        }
    }

    pub fn retry_manager(&self) -> &RetryBufferManager {
        &self.retry
    }

    /// Start curriculum work at a placement-derived position
    pub fn begin_learning(&self, profile: &mut UserProfile, level: Level, module: u8) -> Result<()> {
        if profile.stage != Stage::Placement {
            return Err(CoreError::InvalidStateTransition(format!(
                "user {} is not in placement",
                profile.user_id
            )));
        }
        if self.config.level_index(&level).is_none()
            || !(1..=self.config.modules_per_level).contains(&module)
        {
            return Err(CoreError::InvalidStateTransition(format!(
                "cannot start at {} module {}",
                level, module
            )));
        }

        profile.stage = Stage::Learning;
        profile.position = Position::start_of(level, module);
        profile.current_pass = ModulePass::default();
        profile.placement_answers.clear();
        profile.placed_at = Some(Utc::now());
        Ok(())
    }

    /// Grade an answer to the exercise at the learner's current position
    pub fn record_curriculum_answer(
        &self,
        profile: &mut UserProfile,
        exercise: &Exercise,
        reference: &ExerciseRef,
        answer: &str,
    ) -> Result<AnswerOutcome> {
        if profile.stage != Stage::Learning {
            return Err(CoreError::InvalidStateTransition(format!(
                "user {} answered a curriculum exercise while in {}",
                profile.user_id, profile.stage
            )));
        }
        let position = &profile.position;
        if reference.level != position.level
            || reference.module != position.module
            || reference.index != position.exercise
        {
            return Err(CoreError::InvalidStateTransition(format!(
                "answer for {} does not match the current position",
                reference
            )));
        }

        let correct = exercise.check(answer);
        let module_key = position.module_key();

        let pass = &mut profile.current_pass;
        pass.tally.record(correct);
        pass.skills
            .entry(exercise.skill.clone())
            .or_default()
            .record(correct);
        profile
            .module_history
            .entry(module_key)
            .or_default()
            .record(correct);

        let evicted = if correct {
            // A repeat pass that gets it right retires the earlier miss.
            self.retry.record_success(&mut profile.retry_buffer, reference);
            for word in &exercise.vocabulary {
                if profile.vocabulary.insert(word.clone()) {
                    profile.current_pass.new_vocabulary.insert(word.clone());
                }
            }
            Vec::new()
        } else {
            self.retry.record_miss(&mut profile.retry_buffer, reference)
        };

        debug!(
            user_id = %profile.user_id,
            exercise = %reference,
            correct,
            "Curriculum answer recorded"
        );

        let completion = if profile.position.exercise < self.config.exercises_per_module {
            profile.position.exercise += 1;
            None
        } else {
            Some(self.complete_module(profile)?)
        };

        Ok(AnswerOutcome {
            exercise: reference.clone(),
            correct,
            evicted,
            completion,
        })
    }

    /// Grade an answer to a retry item; counters of the current pass are untouched
    pub fn record_retry_answer(
        &self,
        profile: &mut UserProfile,
        exercise: &Exercise,
        reference: &ExerciseRef,
        answer: &str,
    ) -> AnswerOutcome {
        let correct = exercise.check(answer);
        let evicted = if correct {
            self.retry.record_success(&mut profile.retry_buffer, reference);
            for word in &exercise.vocabulary {
                profile.vocabulary.insert(word.clone());
            }
            Vec::new()
        } else {
            self.retry.record_miss(&mut profile.retry_buffer, reference)
        };

        debug!(
            user_id = %profile.user_id,
            exercise = %reference,
            correct,
            "Retry answer recorded"
        );

        AnswerOutcome {
            exercise: reference.clone(),
            correct,
            evicted,
            completion: None,
        }
    }

    /// Module-end decision for a pass
    pub fn decide(&self, tally: &Tally) -> ModuleDecision {
        let ratio = tally.ratio();
        if ratio >= self.config.excellent_threshold {
            ModuleDecision::FastTrack
        } else if ratio <= self.config.error_threshold {
            ModuleDecision::Remediate
        } else {
            ModuleDecision::Advance
        }
    }

    fn complete_module(&self, profile: &mut UserProfile) -> Result<ModuleCompletion> {
        let pass = std::mem::take(&mut profile.current_pass);
        let level = profile.position.level.clone();
        let module = profile.position.module;
        let decision = self.decide(&pass.tally);

        let progression = match decision {
            ModuleDecision::Remediate => {
                profile.position.exercise = 1;
                profile.retry_emphasis = true;
                Progression::Repeat {
                    level: level.clone(),
                    module,
                }
            }
            ModuleDecision::FastTrack => {
                profile.retry_emphasis = false;
                self.advance(profile, 1 + self.config.fast_track_extra_modules)?
            }
            ModuleDecision::Advance => {
                profile.retry_emphasis = false;
                self.advance(profile, 1)?
            }
        };

        debug!(
            user_id = %profile.user_id,
            level = %level,
            module,
            ratio = pass.tally.ratio(),
            decision = %decision,
            "Module completed"
        );

        Ok(ModuleCompletion {
            level,
            module,
            pass,
            decision,
            progression,
        })
    }

    /// Move forward by `steps` modules, never past the end of the level.
    ///
    /// From the last module of a level this moves to module 1 of the next
    /// level, or marks the curriculum complete at the top level.
    pub fn advance(&self, profile: &mut UserProfile, steps: u8) -> Result<Progression> {
        let last = self.config.modules_per_level;
        let position = &mut profile.position;
        if self.config.level_index(&position.level).is_none() {
            return Err(CoreError::InvalidStateTransition(format!(
                "unknown level {}",
                position.level
            )));
        }
        if !(1..=last).contains(&position.module) {
            return Err(CoreError::InvalidStateTransition(format!(
                "module {} outside 1..={}",
                position.module, last
            )));
        }
        if steps == 0 {
            return Err(CoreError::InvalidStateTransition(
                "advance needs at least one step".to_string(),
            ));
        }

        if position.module < last {
            position.module = position.module.saturating_add(steps).min(last);
            position.exercise = 1;
            return Ok(Progression::Module {
                level: position.level.clone(),
                module: position.module,
            });
        }

        let from = position.level.clone();
        match self.config.next_level(&from).cloned() {
            Some(to) => {
                *position = Position::start_of(to.clone(), 1);
                info!(user_id = %profile.user_id, from = %from, to = %to, "Level up");
                Ok(Progression::LevelUp { from, to })
            }
            None => {
                position.exercise = 1;
                profile.stage = Stage::Complete;
                profile.completed_at = Some(Utc::now());
                profile.session_queue.clear();
                info!(user_id = %profile.user_id, level = %from, "Curriculum complete");
                Ok(Progression::Complete { level: from })
            }
        }
    }
}
