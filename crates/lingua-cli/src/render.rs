//! Terminal text for engine actions

use lingua::ProgressReport;
use lingua_core::{
    AnswerFeedback, ExercisePrompt, LevelComplete, ModuleSummary, NextAction, PlacementPrompt,
    PlacementResult, Progression,
};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━";

pub const WELCOME: &str = "\
Hi! I'm your personal English assistant.

I will help you:
  • find your current level
  • take a course tailored to you
  • practise dialogues with AI
  • track your progress

Let's start! What's your name?";

pub const HELP: &str = "\
Type your answer and press Enter. For choices you can type the option number.
  /review            practise the exercises you missed
  /progress          show your progress
  /practice <text>   chat with the AI partner
  /correct <text>    ask the AI to correct your sentence
  /help              show this help
  exit               leave";

pub fn action(action: &NextAction) -> String {
    match action {
        NextAction::AskPlacementQuestion(prompt) => placement_question(prompt),
        NextAction::PresentExercise(prompt) => exercise(prompt),
        NextAction::ShowModuleSummary(summary) => module_summary(summary),
        NextAction::ShowLevelComplete(complete) => level_complete(complete),
    }
}

fn options(list: &[String]) -> String {
    list.iter()
        .enumerate()
        .map(|(i, option)| format!("\n  {}) {}", i + 1, option))
        .collect()
}

fn placement_question(prompt: &PlacementPrompt) -> String {
    format!(
        "📝 Placement {}/{}\n{}{}",
        prompt.number,
        prompt.total,
        prompt.prompt,
        options(&prompt.options)
    )
}

fn exercise(prompt: &ExercisePrompt) -> String {
    let header = if prompt.is_retry {
        format!("🔁 Review · {} (missed {}x)", prompt.module_title, prompt.misses)
    } else {
        format!(
            "📘 {} · {} · exercise {}/{}",
            prompt.exercise.level,
            prompt.module_title,
            prompt.exercise.index,
            prompt.exercises_per_module
        )
    };
    format!("{}\n{}{}", header, prompt.prompt, options(&prompt.options))
}

/// The module-complete message
pub fn module_summary(summary: &ModuleSummary) -> String {
    let next = match &summary.progression {
        Progression::Repeat { .. } => "Let's go through this module again, with extra review.".to_string(),
        Progression::Module { module, .. } => format!("Next up: module {}.", module),
        Progression::LevelUp { to, .. } => format!("Level up! Welcome to {}.", to),
        Progression::Complete { level } => format!("You have finished level {}!", level),
    };
    let new_words = if summary.new_words.is_empty() {
        "0".to_string()
    } else {
        format!("{} ({})", summary.new_words.len(), summary.new_words.join(", "))
    };

    format!(
        "Module {}/{} results:\n{}\nCorrect answers: {}/{}\nNew words learned: {}\nYour strength: {}\nWork on: {}\n\n{}\nPress Enter to continue.",
        summary.module,
        summary.modules_per_level,
        RULE,
        summary.correct,
        summary.total,
        new_words,
        summary.strongest_skill.as_deref().unwrap_or("-"),
        summary.weakest_skill.as_deref().unwrap_or("-"),
        next
    )
}

fn level_complete(complete: &LevelComplete) -> String {
    let mut text = String::new();
    if let Some(summary) = &complete.final_summary {
        text.push_str(&module_summary(summary));
        text.push_str("\n\n");
    }
    text.push_str(&format!(
        "🎉 Course complete at level {}! Words learned: {}.",
        complete.level, complete.vocabulary_size
    ));
    if complete.review_available > 0 {
        text.push_str(&format!(
            "\n{} exercises are waiting in /review.",
            complete.review_available
        ));
    }
    text
}

pub fn feedback(feedback: &AnswerFeedback) -> String {
    if feedback.correct {
        "✅ Correct!".to_string()
    } else {
        format!("❌ Not quite. Answer: {}", feedback.expected.join(" / "))
    }
}

pub fn placement(result: &PlacementResult) -> String {
    format!(
        "Placement finished: {}/{} correct. You start at {}, module {}.",
        result.correct, result.total, result.level, result.module
    )
}

pub fn progress(report: &ProgressReport) -> String {
    let mut text = format!(
        "👤 {}{}\n{}\nStage: {}\nLevel: {}, module {}/{}",
        report.display_name,
        report
            .grade
            .map(|g| format!(" (grade {})", g))
            .unwrap_or_default(),
        RULE,
        report.stage,
        report.level,
        report.module,
        report.modules_per_level,
    );
    if report.placement_answered > 0 {
        text.push_str(&format!("\nPlacement answers: {}", report.placement_answered));
    }
    text.push_str(&format!(
        "\nOverall: {}/{} correct ({:.0}%)\nModules attempted: {}\nWords learned: {}\nWaiting for review: {}",
        report.lifetime.correct,
        report.lifetime.total(),
        report.overall_mastery * 100.0,
        report.modules_attempted,
        report.vocabulary_size,
        report.retry_buffer_size,
    ));
    if let Some(done) = report.completed_at {
        text.push_str(&format!("\nCompleted: {}", done.format("%Y-%m-%d")));
    }
    text
}

/// Map an option number typed by the learner to the option text
pub fn resolve_choice(action: &NextAction, input: &str) -> String {
    let options = match action {
        NextAction::AskPlacementQuestion(prompt) => &prompt.options,
        NextAction::PresentExercise(prompt) => &prompt.options,
        _ => return input.to_string(),
    };
    input
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i))
        .cloned()
        .unwrap_or_else(|| input.to_string())
}
