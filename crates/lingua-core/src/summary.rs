//! Module-complete summaries
//!
//! Pure data derived from a finished pass; transports turn it into text.

use crate::{Level, ModuleCompletion, ModuleDecision, Progression, Tally};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Fields of the module-complete message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub level: Level,
    pub module: u8,
    pub modules_per_level: u8,
    pub correct: u32,
    pub total: u32,
    pub new_words: Vec<String>,
    pub strongest_skill: Option<String>,
    pub weakest_skill: Option<String>,
    pub decision: ModuleDecision,
    pub progression: Progression,
}

/// Build the summary of a finished module pass
pub fn summarize(completion: &ModuleCompletion, modules_per_level: u8) -> ModuleSummary {
    let pass = &completion.pass;

    let mut skills: Vec<(&String, &Tally)> = pass.skills.iter().collect();
    skills.sort_by(|(a_name, a), (b_name, b)| {
        b.ratio()
            .partial_cmp(&a.ratio())
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.correct.cmp(&a.correct))
            .then_with(|| a_name.cmp(b_name))
    });

    let strongest = skills
        .first()
        .filter(|(_, tally)| tally.correct > 0)
        .map(|(name, _)| (*name).clone());
    let weakest = skills
        .last()
        .filter(|(_, tally)| tally.incorrect > 0)
        .filter(|(name, _)| strongest.as_ref() != Some(*name) || skills.len() == 1)
        .map(|(name, _)| (*name).clone());

    ModuleSummary {
        level: completion.level.clone(),
        module: completion.module,
        modules_per_level,
        correct: pass.tally.correct,
        total: pass.tally.total(),
        new_words: pass.new_vocabulary.iter().cloned().collect(),
        strongest_skill: strongest,
        weakest_skill: weakest,
        decision: completion.decision,
        progression: completion.progression.clone(),
    }
}
