use lingua_core::{
    AnswerFeedback, Catalog, CoreError, EngineConfig, EventType, Exercise, ExercisePrompt,
    ExerciseRef, InboundEvent, LevelComplete, ModuleSummary, NextAction, Outcome,
    PlacementEvaluator, PlacementPrompt, PlacementQuestion, ProgressTracker, Stage, UserId,
    UserProfile, summarize,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{ProgressReport, UserLocks};
use crate::error::{LinguaError, Result};
use crate::profile::{ProfileError, ProfileRepository};

/// Routes learner input to placement or progress tracking and decides what
/// to show next.
///
/// Every call runs load, decide, mutate and persist while holding the
/// user's lock. Mutations happen on a working copy that is only committed
/// once the repository accepts it, so a failed save leaves the stored
/// profile as it was.
#[derive(Clone)]
pub struct AdaptiveDispatcher {
    catalog: Arc<Catalog>,
    config: EngineConfig,
    repository: Arc<dyn ProfileRepository>,
    placement: PlacementEvaluator,
    tracker: ProgressTracker,
    locks: UserLocks,
}

impl AdaptiveDispatcher {
    pub fn new(
        catalog: Arc<Catalog>,
        config: EngineConfig,
        repository: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            placement: PlacementEvaluator::new(&config),
            tracker: ProgressTracker::new(&config),
            catalog,
            config,
            repository,
            locks: UserLocks::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a learner at the start of the placement test and return the
    /// first question
    pub async fn register(
        &self,
        user_id: UserId,
        display_name: &str,
        grade: Option<u8>,
    ) -> Result<NextAction> {
        let _guard = self.locks.acquire(&user_id).await;

        let name = display_name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("display name cannot be empty".to_string()).into());
        }
        if grade.is_some_and(|g| !(5..=9).contains(&g)) {
            return Err(CoreError::InvalidInput("grade must be within 5..=9".to_string()).into());
        }
        if self.repository.exists(&user_id).await? {
            return Err(ProfileError::AlreadyExists(user_id.to_string()).into());
        }

        let start = self
            .config
            .lowest_level()
            .cloned()
            .ok_or_else(|| CoreError::InvalidConfig("no levels configured".to_string()))?;
        let mut profile = UserProfile::new(user_id, name, start);
        profile.grade = grade;

        let action = self.placement_prompt(0)?;
        self.commit(profile.clone()).await?;
        info!(user_id = %profile.user_id, grade = ?grade, "Learner registered");
        Ok(action)
    }

    /// What to show when a learner opens a session
    pub async fn start_session(&self, user_id: &UserId) -> Result<NextAction> {
        let _guard = self.locks.acquire(user_id).await;
        let stored = self.load(user_id).await?;
        let mut profile = stored.clone();

        let action = match profile.stage {
            Stage::Placement => self.placement_prompt(profile.placement_answers.len())?,
            Stage::Learning => {
                if profile.session_queue.is_empty() {
                    self.queue_retries(&mut profile);
                }
                self.present_next(&mut profile)?
            }
            Stage::Complete => Self::level_complete(&profile, None),
        };

        if profile != stored {
            self.commit(profile).await?;
        }
        Ok(action)
    }

    /// Queue every item of the retry buffer for a review-only pass
    pub async fn start_review(&self, user_id: &UserId) -> Result<NextAction> {
        let _guard = self.locks.acquire(user_id).await;
        let stored = self.load(user_id).await?;
        if stored.stage == Stage::Placement {
            return Err(CoreError::InvalidInput(
                "review is available after the placement test".to_string(),
            )
            .into());
        }

        let mut profile = stored.clone();
        let manager = self.tracker.retry_manager();
        profile.session_queue = manager
            .select_for_session(&profile.retry_buffer, profile.retry_buffer.len())
            .into_iter()
            .map(|entry| entry.exercise)
            .collect();
        debug!(user_id = %user_id, items = profile.session_queue.len(), "Review queued");

        let action = self.present_next(&mut profile)?;
        if profile != stored {
            self.commit(profile).await?;
        }
        Ok(action)
    }

    /// Grade an answer to whatever the learner is currently shown
    pub async fn submit_answer(&self, user_id: &UserId, answer: &str) -> Result<Outcome> {
        self.submit(user_id, answer, None).await
    }

    /// Route an inbound transport event
    pub async fn handle(&self, event: InboundEvent) -> Result<Outcome> {
        debug!(event_id = %event.id, user_id = %event.user_id, event_type = %event.event_type, "Event received");
        match event.event_type {
            EventType::Start => {
                let action = self.start_session(&event.user_id).await?;
                Ok(Outcome {
                    feedback: None,
                    placement: None,
                    action,
                })
            }
            event_type => {
                self.submit(&event.user_id, &event.payload, Some(event_type))
                    .await
            }
        }
    }

    /// Read-only progress snapshot
    pub async fn progress(&self, user_id: &UserId) -> Result<ProgressReport> {
        let profile = self.load(user_id).await?;
        Ok(ProgressReport::from_profile(&profile, &self.config))
    }

    pub async fn profile(&self, user_id: &UserId) -> Result<UserProfile> {
        self.load(user_id).await
    }

    async fn submit(
        &self,
        user_id: &UserId,
        answer: &str,
        expected: Option<EventType>,
    ) -> Result<Outcome> {
        let _guard = self.locks.acquire(user_id).await;
        let stored = self.load(user_id).await?;
        let mut profile = stored.clone();

        if let Some(event_type) = expected {
            let fits = match event_type {
                EventType::PlacementAnswer => profile.stage == Stage::Placement,
                EventType::ExerciseAnswer => profile.stage != Stage::Placement,
                EventType::Start => false,
            };
            if !fits {
                return Err(CoreError::InvalidInput(format!(
                    "{} does not apply while the learner is in {}",
                    event_type, profile.stage
                ))
                .into());
            }
        }

        let result = match profile.stage {
            Stage::Placement => self.answer_placement(&mut profile, answer),
            Stage::Learning => self.answer_learning(&mut profile, answer),
            Stage::Complete => self.answer_review(&mut profile, answer),
        };
        let outcome = result.inspect_err(|e| {
            if let CoreError::InvalidStateTransition(reason) = e {
                error!(user_id = %user_id, reason = %reason, "Invalid state transition");
            }
        })?;

        self.commit(profile).await?;
        Ok(outcome)
    }

    fn answer_placement(&self, profile: &mut UserProfile, answer: &str) -> lingua_core::Result<Outcome> {
        let questions = self.catalog.placement_questions();
        profile.placement_answers.push(answer.trim().to_string());

        let answered = profile.placement_answers.len();
        if answered < questions.len() {
            return Ok(Outcome {
                feedback: None,
                placement: None,
                action: self.placement_prompt(answered)?,
            });
        }

        let result = {
            let responses: Vec<(&PlacementQuestion, &str)> = questions
                .iter()
                .zip(profile.placement_answers.iter().map(String::as_str))
                .collect();
            self.placement.evaluate(&responses)?
        };

        self.tracker
            .begin_learning(profile, result.level.clone(), result.module)?;
        info!(
            user_id = %profile.user_id,
            correct = result.correct,
            total = result.total,
            level = %result.level,
            module = result.module,
            "Placement finished"
        );

        Ok(Outcome {
            feedback: None,
            placement: Some(result),
            action: self.present_next(profile)?,
        })
    }

    fn answer_learning(&self, profile: &mut UserProfile, answer: &str) -> lingua_core::Result<Outcome> {
        if let Some(outcome) = self.answer_retry(profile, answer)? {
            return Ok(outcome);
        }

        let position = &profile.position;
        let reference =
            self.catalog
                .exercise_ref(&position.level, position.module, position.exercise)?;
        let exercise = self.catalog.resolve(&reference)?;
        let outcome = self
            .tracker
            .record_curriculum_answer(profile, exercise, &reference, answer)?;
        let feedback = Self::feedback(exercise, outcome.correct, false);

        let action = match outcome.completion {
            Some(completion) => {
                let summary = summarize(&completion, self.config.modules_per_level);
                if profile.stage == Stage::Complete {
                    Self::level_complete(profile, Some(summary))
                } else {
                    NextAction::ShowModuleSummary(summary)
                }
            }
            None => self.present_next(profile)?,
        };

        Ok(Outcome {
            feedback: Some(feedback),
            placement: None,
            action,
        })
    }

    fn answer_review(&self, profile: &mut UserProfile, answer: &str) -> lingua_core::Result<Outcome> {
        match self.answer_retry(profile, answer)? {
            Some(outcome) => Ok(outcome),
            None => Ok(Outcome {
                feedback: None,
                placement: None,
                action: Self::level_complete(profile, None),
            }),
        }
    }

    /// Grade the head of the session queue, if any
    fn answer_retry(
        &self,
        profile: &mut UserProfile,
        answer: &str,
    ) -> lingua_core::Result<Option<Outcome>> {
        while let Some(reference) = profile.session_queue.pop_front() {
            let Some(exercise) = self.resolve_queued(profile, &reference) else {
                continue;
            };
            let outcome = self
                .tracker
                .record_retry_answer(profile, exercise, &reference, answer);
            let feedback = Self::feedback(exercise, outcome.correct, true);
            return Ok(Some(Outcome {
                feedback: Some(feedback),
                placement: None,
                action: self.present_next(profile)?,
            }));
        }
        Ok(None)
    }

    /// Next queued retry item, then the curriculum exercise at the pointer
    fn present_next(&self, profile: &mut UserProfile) -> lingua_core::Result<NextAction> {
        while let Some(reference) = profile.session_queue.front().cloned() {
            let Some(exercise) = self.resolve_queued(profile, &reference) else {
                profile.session_queue.pop_front();
                continue;
            };
            let misses = profile
                .retry_buffer
                .get(&reference)
                .map(|entry| entry.misses)
                .unwrap_or(0);
            return self.exercise_prompt(reference, exercise, true, misses);
        }

        match profile.stage {
            Stage::Learning => {
                let position = &profile.position;
                let reference =
                    self.catalog
                        .exercise_ref(&position.level, position.module, position.exercise)?;
                let exercise = self.catalog.resolve(&reference)?;
                self.exercise_prompt(reference, exercise, false, 0)
            }
            Stage::Complete => Ok(Self::level_complete(profile, None)),
            Stage::Placement => Err(CoreError::InvalidStateTransition(format!(
                "user {} has no exercise during placement",
                profile.user_id
            ))),
        }
    }

    /// Resolve a queued reference; stale ones are dropped from the retry buffer
    fn resolve_queued(&self, profile: &mut UserProfile, reference: &ExerciseRef) -> Option<&Exercise> {
        match self.catalog.resolve(reference) {
            Ok(exercise) => Some(exercise),
            Err(e) => {
                warn!(user_id = %profile.user_id, exercise = %reference, error = %e, "Dropping stale retry item");
                self.tracker
                    .retry_manager()
                    .record_success(&mut profile.retry_buffer, reference);
                None
            }
        }
    }

    fn queue_retries(&self, profile: &mut UserProfile) {
        let n = self.config.retry_items_for(profile.retry_emphasis);
        profile.session_queue = self
            .tracker
            .retry_manager()
            .select_for_session(&profile.retry_buffer, n)
            .into_iter()
            .map(|entry| entry.exercise)
            .collect();
        if !profile.session_queue.is_empty() {
            debug!(
                user_id = %profile.user_id,
                items = profile.session_queue.len(),
                emphasis = profile.retry_emphasis,
                "Retry items queued"
            );
        }
    }

    fn exercise_prompt(
        &self,
        reference: ExerciseRef,
        exercise: &Exercise,
        is_retry: bool,
        misses: u32,
    ) -> lingua_core::Result<NextAction> {
        let module = self.catalog.module(&reference.level, reference.module)?;
        Ok(NextAction::PresentExercise(ExercisePrompt {
            module_title: module.title.clone(),
            exercises_per_module: self.config.exercises_per_module,
            prompt: exercise.prompt.clone(),
            options: exercise.options.clone(),
            exercise: reference,
            is_retry,
            misses,
        }))
    }

    fn placement_prompt(&self, index: usize) -> lingua_core::Result<NextAction> {
        let question = self.catalog.placement_question(index)?;
        Ok(NextAction::AskPlacementQuestion(PlacementPrompt {
            question_id: question.id.clone(),
            number: index + 1,
            total: self.catalog.placement_questions().len(),
            prompt: question.prompt.clone(),
            options: question.options.clone(),
        }))
    }

    fn level_complete(profile: &UserProfile, final_summary: Option<ModuleSummary>) -> NextAction {
        NextAction::ShowLevelComplete(LevelComplete {
            level: profile.position.level.clone(),
            vocabulary_size: profile.vocabulary.len(),
            review_available: profile.retry_buffer.len(),
            final_summary,
        })
    }

    fn feedback(exercise: &Exercise, correct: bool, is_retry: bool) -> AnswerFeedback {
        AnswerFeedback {
            correct,
            expected: if correct {
                Vec::new()
            } else {
                exercise.answers.clone()
            },
            is_retry,
        }
    }

    async fn load(&self, user_id: &UserId) -> Result<UserProfile> {
        self.repository
            .load(user_id)
            .await?
            .ok_or_else(|| LinguaError::from(ProfileError::NotFound(user_id.to_string())))
    }

    async fn commit(&self, mut profile: UserProfile) -> Result<()> {
        profile.touch();
        self.repository.save(&profile).await.map_err(|e| {
            error!(user_id = %profile.user_id, error = %e, "Failed to persist profile, changes discarded");
            LinguaError::from(e)
        })
    }
}
