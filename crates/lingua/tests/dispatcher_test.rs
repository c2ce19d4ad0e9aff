use async_trait::async_trait;
use lingua::dispatcher::AdaptiveDispatcher;
use lingua::profile::{
    FileProfileRepository, InMemoryProfileRepository, ProfileError, ProfileRepository,
    ProfileResult,
};
use lingua::sample::sample_catalog;
use lingua::storage::LocalStorage;
use lingua::{CoreError, LinguaError};
use lingua_core::{
    EngineConfig, EventType, InboundEvent, Level, ModuleDecision, NextAction, Outcome, Position,
    Progression, Stage, UserId, UserProfile,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn dispatcher(repository: Arc<dyn ProfileRepository>) -> AdaptiveDispatcher {
    let config = EngineConfig::default();
    let catalog = sample_catalog(&config).unwrap();
    AdaptiveDispatcher::new(Arc::new(catalog), config, repository)
}

async fn seed_learner(
    repository: &dyn ProfileRepository,
    id: &str,
    level: &str,
    module: u8,
) -> UserId {
    let mut profile = UserProfile::new(UserId::from_string(id), "Test", Level::new(level));
    profile.stage = Stage::Learning;
    profile.position = Position::start_of(Level::new(level), module);
    repository.save(&profile).await.unwrap();
    profile.user_id
}

async fn current_answer(dispatcher: &AdaptiveDispatcher, user: &UserId) -> String {
    let profile = dispatcher.profile(user).await.unwrap();
    let position = &profile.position;
    dispatcher
        .catalog()
        .exercise(&position.level, position.module, position.exercise)
        .unwrap()
        .answers[0]
        .clone()
}

/// Answer one full module, the first `correct` answers right and the rest wrong
async fn play_module(dispatcher: &AdaptiveDispatcher, user: &UserId, correct: usize) -> Outcome {
    let mut last = None;
    for i in 0..5 {
        let answer = if i < correct {
            current_answer(dispatcher, user).await
        } else {
            "wrong".to_string()
        };
        last = Some(dispatcher.submit_answer(user, &answer).await.unwrap());
    }
    last.unwrap()
}

#[tokio::test]
async fn test_registration_and_placement() {
    let repo = Arc::new(InMemoryProfileRepository::new());
    let dispatcher = dispatcher(repo.clone());
    let user = UserId::from_string("100");

    let action = dispatcher.register(user.clone(), "Olga", Some(6)).await.unwrap();
    match action {
        NextAction::AskPlacementQuestion(prompt) => {
            assert_eq!(prompt.number, 1);
            assert_eq!(prompt.total, 15);
        }
        other => panic!("unexpected action {:?}", other),
    }

    let questions = dispatcher.catalog().placement_questions().to_vec();
    let mut outcome = None;
    for (i, question) in questions.iter().enumerate() {
        let answer = if i < 8 { question.answers[0].as_str() } else { "x" };
        let result = dispatcher.submit_answer(&user, answer).await.unwrap();
        assert!(result.feedback.is_none());
        if i < 14 {
            assert!(result.placement.is_none());
            assert!(matches!(
                result.action,
                NextAction::AskPlacementQuestion(ref p) if p.number == i + 2
            ));
        }
        outcome = Some(result);
    }

    let outcome = outcome.unwrap();
    let placement = outcome.placement.unwrap();
    assert_eq!(placement.correct, 8);
    assert_eq!(placement.level, Level::new("A2"));
    assert_eq!(placement.module, 2);

    match outcome.action {
        NextAction::PresentExercise(prompt) => {
            assert_eq!(prompt.exercise.level, Level::new("A2"));
            assert_eq!(prompt.exercise.module, 2);
            assert_eq!(prompt.exercise.index, 1);
            assert!(!prompt.is_retry);
        }
        other => panic!("unexpected action {:?}", other),
    }

    let profile = dispatcher.profile(&user).await.unwrap();
    assert_eq!(profile.stage, Stage::Learning);
    assert_eq!(profile.grade, Some(6));
    assert!(profile.placement_answers.is_empty());
    assert!(profile.placed_at.is_some());
}

#[tokio::test]
async fn test_register_twice_is_rejected() {
    let dispatcher = dispatcher(Arc::new(InMemoryProfileRepository::new()));
    let user = UserId::from_string("1");

    dispatcher.register(user.clone(), "Ann", None).await.unwrap();
    let result = dispatcher.register(user, "Ann", None).await;
    assert!(matches!(
        result,
        Err(LinguaError::Profile(ProfileError::AlreadyExists(_)))
    ));
}

#[tokio::test]
async fn test_register_validates_input() {
    let dispatcher = dispatcher(Arc::new(InMemoryProfileRepository::new()));

    let result = dispatcher.register(UserId::from_string("1"), "  ", None).await;
    assert!(matches!(result, Err(LinguaError::Core(CoreError::InvalidInput(_)))));

    let result = dispatcher.register(UserId::from_string("2"), "Bo", Some(11)).await;
    assert!(matches!(result, Err(LinguaError::Core(CoreError::InvalidInput(_)))));
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let dispatcher = dispatcher(Arc::new(InMemoryProfileRepository::new()));
    let result = dispatcher.start_session(&UserId::from_string("ghost")).await;
    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_two_of_five_remediates() {
    let repo = Arc::new(InMemoryProfileRepository::new());
    let dispatcher = dispatcher(repo.clone());
    let user = seed_learner(repo.as_ref(), "7", "A1", 3).await;

    let outcome = play_module(&dispatcher, &user, 2).await;
    let feedback = outcome.feedback.unwrap();
    assert!(!feedback.correct);
    assert!(!feedback.expected.is_empty());

    match outcome.action {
        NextAction::ShowModuleSummary(summary) => {
            assert_eq!(summary.module, 3);
            assert_eq!(summary.modules_per_level, 12);
            assert_eq!(summary.correct, 2);
            assert_eq!(summary.total, 5);
            assert_eq!(summary.decision, ModuleDecision::Remediate);
            assert_eq!(
                summary.progression,
                Progression::Repeat {
                    level: Level::new("A1"),
                    module: 3
                }
            );
        }
        other => panic!("unexpected action {:?}", other),
    }

    let profile = dispatcher.profile(&user).await.unwrap();
    assert_eq!(profile.position, Position::start_of(Level::new("A1"), 3));
    assert!(profile.retry_emphasis);
    assert_eq!(profile.retry_buffer.len(), 3);

    // Emphasis doubles the retry items queued for the next session
    let action = dispatcher.start_session(&user).await.unwrap();
    match action {
        NextAction::PresentExercise(prompt) => {
            assert!(prompt.is_retry);
            assert_eq!(prompt.misses, 1);
        }
        other => panic!("unexpected action {:?}", other),
    }
    let profile = dispatcher.profile(&user).await.unwrap();
    assert_eq!(profile.session_queue.len(), 3);
}

#[tokio::test]
async fn test_five_of_five_advances_one_module() {
    let repo = Arc::new(InMemoryProfileRepository::new());
    let dispatcher = dispatcher(repo.clone());
    let user = seed_learner(repo.as_ref(), "8", "A2", 4).await;

    let outcome = play_module(&dispatcher, &user, 5).await;
    match outcome.action {
        NextAction::ShowModuleSummary(summary) => {
            assert_eq!(summary.decision, ModuleDecision::FastTrack);
            assert_eq!(summary.new_words.len(), 3);
            assert_eq!(summary.strongest_skill.as_deref(), Some("vocabulary"));
            assert_eq!(summary.weakest_skill, None);
        }
        other => panic!("unexpected action {:?}", other),
    }

    let profile = dispatcher.profile(&user).await.unwrap();
    assert_eq!(profile.position, Position::start_of(Level::new("A2"), 5));
    assert!(!profile.retry_emphasis);
    assert!(profile.retry_buffer.is_empty());
}

#[tokio::test]
async fn test_module_twelve_levels_up() {
    let repo = Arc::new(InMemoryProfileRepository::new());
    let dispatcher = dispatcher(repo.clone());
    let user = seed_learner(repo.as_ref(), "9", "A1", 12).await;

    let outcome = play_module(&dispatcher, &user, 4).await;
    match outcome.action {
        NextAction::ShowModuleSummary(summary) => {
            assert_eq!(summary.decision, ModuleDecision::Advance);
            assert_eq!(
                summary.progression,
                Progression::LevelUp {
                    from: Level::new("A1"),
                    to: Level::new("A2")
                }
            );
        }
        other => panic!("unexpected action {:?}", other),
    }

    let profile = dispatcher.profile(&user).await.unwrap();
    assert_eq!(profile.position, Position::start_of(Level::new("A2"), 1));
}

#[tokio::test]
async fn test_finishing_top_level_completes() {
    let repo = Arc::new(InMemoryProfileRepository::new());
    let dispatcher = dispatcher(repo.clone());
    let user = seed_learner(repo.as_ref(), "10", "B1", 12).await;

    let outcome = play_module(&dispatcher, &user, 5).await;
    match outcome.action {
        NextAction::ShowLevelComplete(complete) => {
            assert_eq!(complete.level, Level::new("B1"));
            let summary = complete.final_summary.unwrap();
            assert_eq!(
                summary.progression,
                Progression::Complete {
                    level: Level::new("B1")
                }
            );
        }
        other => panic!("unexpected action {:?}", other),
    }

    let profile = dispatcher.profile(&user).await.unwrap();
    assert_eq!(profile.stage, Stage::Complete);
    assert!(profile.completed_at.is_some());

    let action = dispatcher.start_session(&user).await.unwrap();
    assert!(matches!(
        action,
        NextAction::ShowLevelComplete(ref c) if c.final_summary.is_none()
    ));
}

#[tokio::test]
async fn test_retry_items_come_before_curriculum() {
    let repo = Arc::new(InMemoryProfileRepository::new());
    let dispatcher = dispatcher(repo.clone());
    let user = seed_learner(repo.as_ref(), "11", "A1", 1).await;

    // 3/5 advances while leaving two misses in the buffer
    play_module(&dispatcher, &user, 3).await;
    let profile = dispatcher.profile(&user).await.unwrap();
    assert_eq!(profile.retry_buffer.len(), 2);
    assert_eq!(profile.position.module, 2);

    let action = dispatcher.start_session(&user).await.unwrap();
    let first = match action {
        NextAction::PresentExercise(prompt) => prompt,
        other => panic!("unexpected action {:?}", other),
    };
    assert!(first.is_retry);

    let answer = dispatcher.catalog().resolve(&first.exercise).unwrap().answers[0].clone();
    let outcome = dispatcher.submit_answer(&user, &answer).await.unwrap();
    let feedback = outcome.feedback.unwrap();
    assert!(feedback.correct);
    assert!(feedback.is_retry);
    assert!(matches!(outcome.action, NextAction::PresentExercise(ref p) if p.is_retry));

    let outcome = dispatcher.submit_answer(&user, "still wrong").await.unwrap();
    assert!(!outcome.feedback.unwrap().correct);
    match outcome.action {
        NextAction::PresentExercise(prompt) => {
            assert!(!prompt.is_retry);
            assert_eq!(prompt.exercise.module, 2);
            assert_eq!(prompt.exercise.index, 1);
        }
        other => panic!("unexpected action {:?}", other),
    }

    let profile = dispatcher.profile(&user).await.unwrap();
    assert_eq!(profile.retry_buffer.len(), 1);
    assert_eq!(profile.retry_buffer.entries()[0].misses, 2);
    assert_eq!(profile.current_pass.tally.total(), 0);
}

#[tokio::test]
async fn test_review_after_completion() {
    let repo = Arc::new(InMemoryProfileRepository::new());
    let dispatcher = dispatcher(repo.clone());
    let user = seed_learner(repo.as_ref(), "12", "B1", 12).await;

    play_module(&dispatcher, &user, 4).await;
    assert_eq!(dispatcher.profile(&user).await.unwrap().stage, Stage::Complete);

    let action = dispatcher.start_review(&user).await.unwrap();
    let prompt = match action {
        NextAction::PresentExercise(prompt) => prompt,
        other => panic!("unexpected action {:?}", other),
    };
    assert!(prompt.is_retry);

    let answer = dispatcher.catalog().resolve(&prompt.exercise).unwrap().answers[0].clone();
    let outcome = dispatcher.submit_answer(&user, &answer).await.unwrap();
    assert!(outcome.feedback.unwrap().correct);
    match outcome.action {
        NextAction::ShowLevelComplete(complete) => assert_eq!(complete.review_available, 0),
        other => panic!("unexpected action {:?}", other),
    }
}

#[tokio::test]
async fn test_review_unavailable_during_placement() {
    let dispatcher = dispatcher(Arc::new(InMemoryProfileRepository::new()));
    let user = UserId::from_string("13");
    dispatcher.register(user.clone(), "Ida", None).await.unwrap();

    let result = dispatcher.start_review(&user).await;
    assert!(matches!(result, Err(LinguaError::Core(CoreError::InvalidInput(_)))));
}

#[tokio::test]
async fn test_event_routing() {
    let repo = Arc::new(InMemoryProfileRepository::new());
    let dispatcher = dispatcher(repo.clone());
    let user = seed_learner(repo.as_ref(), "14", "A1", 1).await;

    let outcome = dispatcher.handle(InboundEvent::start(user.clone())).await.unwrap();
    assert!(matches!(outcome.action, NextAction::PresentExercise(_)));

    let mismatched = InboundEvent::answer(user.clone(), EventType::PlacementAnswer, "am");
    let result = dispatcher.handle(mismatched).await;
    assert!(matches!(result, Err(LinguaError::Core(CoreError::InvalidInput(_)))));

    let answer = current_answer(&dispatcher, &user).await;
    let outcome = dispatcher
        .handle(InboundEvent::answer(user.clone(), EventType::ExerciseAnswer, answer))
        .await
        .unwrap();
    assert!(outcome.feedback.unwrap().correct);
}

struct FlakyRepository {
    inner: InMemoryProfileRepository,
    fail_saves: AtomicBool,
}

#[async_trait]
impl ProfileRepository for FlakyRepository {
    async fn load(&self, user_id: &UserId) -> ProfileResult<Option<UserProfile>> {
        self.inner.load(user_id).await
    }

    async fn save(&self, profile: &UserProfile) -> ProfileResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ProfileError::DatabaseError("disk full".to_string()));
        }
        self.inner.save(profile).await
    }

    async fn delete(&self, user_id: &UserId) -> ProfileResult<()> {
        self.inner.delete(user_id).await
    }
}

#[tokio::test]
async fn test_failed_save_leaves_profile_untouched() {
    let repo = Arc::new(FlakyRepository {
        inner: InMemoryProfileRepository::new(),
        fail_saves: AtomicBool::new(false),
    });
    let dispatcher = dispatcher(repo.clone());
    let user = seed_learner(repo.as_ref(), "15", "A1", 1).await;
    let before = dispatcher.profile(&user).await.unwrap();

    repo.fail_saves.store(true, Ordering::SeqCst);
    let result = dispatcher.submit_answer(&user, "wrong").await;
    assert!(matches!(
        result,
        Err(LinguaError::Profile(ProfileError::DatabaseError(_)))
    ));
    assert_eq!(dispatcher.profile(&user).await.unwrap(), before);

    repo.fail_saves.store(false, Ordering::SeqCst);
    let outcome = dispatcher.submit_answer(&user, "wrong").await.unwrap();
    assert!(!outcome.feedback.unwrap().correct);
    let after = dispatcher.profile(&user).await.unwrap();
    assert_eq!(after.current_pass.tally.incorrect, 1);
    assert_eq!(after.retry_buffer.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_answers_are_serialised() {
    let repo = Arc::new(InMemoryProfileRepository::new());
    let dispatcher = dispatcher(repo.clone());
    let user = seed_learner(repo.as_ref(), "16", "A1", 1).await;

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let dispatcher = dispatcher.clone();
            let user = user.clone();
            tokio::spawn(async move { dispatcher.submit_answer(&user, "wrong").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let profile = dispatcher.profile(&user).await.unwrap();
    let history = profile.module_history.get("A1/01").unwrap();
    assert_eq!(history.incorrect, 20);
    assert_eq!(profile.position, Position::start_of(Level::new("A1"), 1));
    assert_eq!(profile.retry_buffer.len(), 5);
    assert!(profile.retry_buffer.entries().iter().all(|e| e.misses == 4));
}

#[tokio::test]
async fn test_file_repository_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(LocalStorage::new(dir.path()));
    let user = UserId::from_string("17");

    let first = dispatcher(Arc::new(FileProfileRepository::new(storage.clone(), "users")));
    first.register(user.clone(), "Max", Some(9)).await.unwrap();
    first.submit_answer(&user, "am").await.unwrap();
    let saved = first.profile(&user).await.unwrap();

    let second = dispatcher(Arc::new(FileProfileRepository::new(storage, "users")));
    let loaded = second.profile(&user).await.unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.placement_answers, vec!["am".to_string()]);

    let action = second.start_session(&user).await.unwrap();
    assert!(matches!(
        action,
        NextAction::AskPlacementQuestion(ref p) if p.number == 2
    ));
}
