//! Curriculum catalog
//!
//! The catalog is loaded once at startup from a JSON document, validated
//! against the [`EngineConfig`] and never mutated afterwards. Lookups are
//! indexed level → module → exercise, with 1-based module and exercise
//! numbers.

use crate::answer::{AnswerRule, normalize};
use crate::{CoreError, EngineConfig, Level, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Default skill tag for exercises that do not declare one
pub const DEFAULT_SKILL: &str = "general";

/// A single question/answer unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub prompt: String,
    /// Accepted answers; any one of them is correct
    pub answers: Vec<String>,
    #[serde(default)]
    pub rule: AnswerRule,
    /// Choices offered to the user (rendered as buttons by transports)
    #[serde(default)]
    pub options: Vec<String>,
    /// Words learned once the exercise is answered correctly
    #[serde(default)]
    pub vocabulary: Vec<String>,
    #[serde(default = "default_skill")]
    pub skill: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
}

impl Exercise {
    /// Check a submitted answer
    pub fn check(&self, answer: &str) -> bool {
        self.rule.matches(&self.answers, answer)
    }
}

/// A placement test question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementQuestion {
    pub id: String,
    pub prompt: String,
    pub answers: Vec<String>,
    #[serde(default)]
    pub rule: AnswerRule,
    #[serde(default)]
    pub options: Vec<String>,
}

impl PlacementQuestion {
    /// Check a submitted answer
    pub fn check(&self, answer: &str) -> bool {
        self.rule.matches(&self.answers, answer)
    }
}

/// A numbered unit of content within a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumModule {
    pub level: Level,
    pub number: u8,
    pub title: String,
    pub exercises: Vec<Exercise>,
}

/// Stable reference to an exercise, stored in profiles and retry buffers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExerciseRef {
    pub level: Level,
    pub module: u8,
    pub index: u8,
    pub exercise_id: String,
}

impl std::fmt::Display for ExerciseRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{} ({})",
            self.level, self.module, self.index, self.exercise_id
        )
    }
}

/// Raw catalog document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSource {
    pub placement_test: Vec<PlacementQuestion>,
    pub levels: HashMap<Level, LevelSource>,
}

/// Raw content for one level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSource {
    pub modules: Vec<ModuleSource>,
}

/// Raw content for one module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSource {
    pub number: u8,
    #[serde(default)]
    pub title: String,
    pub exercises: Vec<Exercise>,
}

/// Immutable, validated curriculum
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Modules per level, in configured level order; index = number - 1
    levels: Vec<(Level, Vec<CurriculumModule>)>,
    placement: Vec<PlacementQuestion>,
}

impl Catalog {
    /// Load and validate a catalog file
    pub fn load(path: impl AsRef<Path>, config: &EngineConfig) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::CatalogLoad(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content, config)
    }

    /// Parse and validate a catalog from JSON text
    pub fn from_json(json: &str, config: &EngineConfig) -> Result<Self> {
        let source: CatalogSource = serde_json::from_str(json)
            .map_err(|e| CoreError::CatalogLoad(format!("Malformed curriculum data: {}", e)))?;
        Self::from_source(source, config)
    }

    /// Validate a parsed catalog document
    pub fn from_source(mut source: CatalogSource, config: &EngineConfig) -> Result<Self> {
        if let Some(unknown) = source
            .levels
            .keys()
            .find(|level| config.level_index(level).is_none())
        {
            return Err(load_error(format!("unknown level {}", unknown)));
        }

        let mut seen_ids = HashSet::new();
        let mut levels = Vec::with_capacity(config.levels.len());
        for level in &config.levels {
            let content = source
                .levels
                .remove(level)
                .ok_or_else(|| load_error(format!("missing level {}", level)))?;
            let modules = build_modules(level, content, config, &mut seen_ids)?;
            levels.push((level.clone(), modules));
        }

        if source.placement_test.len() != config.placement_question_count {
            return Err(load_error(format!(
                "placement test has {} questions, expected {}",
                source.placement_test.len(),
                config.placement_question_count
            )));
        }
        for question in &source.placement_test {
            check_answers(&question.id, &question.answers)?;
            if !seen_ids.insert(question.id.clone()) {
                return Err(load_error(format!("duplicate id {}", question.id)));
            }
        }

        Ok(Self {
            levels,
            placement: source.placement_test,
        })
    }

    /// Look up a module
    pub fn module(&self, level: &Level, number: u8) -> Result<&CurriculumModule> {
        let modules = self
            .levels
            .iter()
            .find(|(l, _)| l == level)
            .map(|(_, modules)| modules)
            .ok_or_else(|| CoreError::NotFound(format!("level {}", level)))?;

        number
            .checked_sub(1)
            .and_then(|i| modules.get(usize::from(i)))
            .ok_or_else(|| CoreError::NotFound(format!("module {} of level {}", number, level)))
    }

    /// Look up an exercise by position
    pub fn exercise(&self, level: &Level, module: u8, index: u8) -> Result<&Exercise> {
        let module_content = self.module(level, module)?;
        index
            .checked_sub(1)
            .and_then(|i| module_content.exercises.get(usize::from(i)))
            .ok_or_else(|| {
                CoreError::NotFound(format!(
                    "exercise {} of module {} in level {}",
                    index, module, level
                ))
            })
    }

    /// Build a stable reference for a position
    pub fn exercise_ref(&self, level: &Level, module: u8, index: u8) -> Result<ExerciseRef> {
        let exercise = self.exercise(level, module, index)?;
        Ok(ExerciseRef {
            level: level.clone(),
            module,
            index,
            exercise_id: exercise.id.clone(),
        })
    }

    /// Resolve a stored reference; fails if the content moved
    pub fn resolve(&self, reference: &ExerciseRef) -> Result<&Exercise> {
        let exercise = self.exercise(&reference.level, reference.module, reference.index)?;
        if exercise.id != reference.exercise_id {
            return Err(CoreError::NotFound(format!("exercise {}", reference)));
        }
        Ok(exercise)
    }

    /// Placement questions in test order
    pub fn placement_questions(&self) -> &[PlacementQuestion] {
        &self.placement
    }

    /// Look up a placement question by 0-based position
    pub fn placement_question(&self, position: usize) -> Result<&PlacementQuestion> {
        self.placement
            .get(position)
            .ok_or_else(|| CoreError::NotFound(format!("placement question {}", position + 1)))
    }

    /// Total number of modules across all levels
    pub fn module_count(&self) -> usize {
        self.levels.iter().map(|(_, modules)| modules.len()).sum()
    }
}

fn build_modules(
    level: &Level,
    content: LevelSource,
    config: &EngineConfig,
    seen_ids: &mut HashSet<String>,
) -> Result<Vec<CurriculumModule>> {
    let expected = usize::from(config.modules_per_level);
    if content.modules.len() != expected {
        return Err(load_error(format!(
            "level {} has {} modules, expected {}",
            level,
            content.modules.len(),
            expected
        )));
    }

    let mut slots: Vec<Option<CurriculumModule>> = vec![None; expected];
    for module in content.modules {
        let slot = module
            .number
            .checked_sub(1)
            .and_then(|i| slots.get_mut(usize::from(i)))
            .ok_or_else(|| {
                load_error(format!(
                    "level {} has out-of-range module {}",
                    level, module.number
                ))
            })?;
        if slot.is_some() {
            return Err(load_error(format!(
                "level {} has duplicate module {}",
                level, module.number
            )));
        }

        if module.exercises.len() != usize::from(config.exercises_per_module) {
            return Err(load_error(format!(
                "module {} of level {} has {} exercises, expected {}",
                module.number,
                level,
                module.exercises.len(),
                config.exercises_per_module
            )));
        }
        for exercise in &module.exercises {
            check_answers(&exercise.id, &exercise.answers)?;
            if !(1..=5).contains(&exercise.difficulty) {
                return Err(load_error(format!(
                    "exercise {} has difficulty {} outside 1..=5",
                    exercise.id, exercise.difficulty
                )));
            }
            if !seen_ids.insert(exercise.id.clone()) {
                return Err(load_error(format!("duplicate id {}", exercise.id)));
            }
        }

        *slot = Some(CurriculumModule {
            level: level.clone(),
            number: module.number,
            title: module.title,
            exercises: module.exercises,
        });
    }

    // Every slot is filled: counts match and numbers are unique and in range.
    Ok(slots.into_iter().flatten().collect())
}

fn check_answers(id: &str, answers: &[String]) -> Result<()> {
    if answers.iter().all(|a| normalize(a).is_empty()) {
        return Err(load_error(format!("{} has no expected answer", id)));
    }
    Ok(())
}

fn load_error(message: impl Into<String>) -> CoreError {
    CoreError::CatalogLoad(message.into())
}

fn default_skill() -> String {
    DEFAULT_SKILL.to_string()
}

fn default_difficulty() -> u8 {
    1
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{Value, json};

    /// Builds a catalog document where every answer is "answer <id>"
    pub(crate) fn sample_source(config: &EngineConfig) -> Value {
        let mut levels = serde_json::Map::new();
        for level in &config.levels {
            let modules: Vec<Value> = (1..=config.modules_per_level)
                .map(|m| {
                    let exercises: Vec<Value> = (1..=config.exercises_per_module)
                        .map(|e| {
                            let id = format!("{}-{}-{}", level, m, e);
                            let skill = if e % 2 == 0 { "grammar" } else { "vocabulary" };
                            json!({
                                "id": id,
                                "prompt": format!("Prompt {}", id),
                                "answers": [format!("answer {}", id)],
                                "vocabulary": [format!("word-{}", id)],
                                "skill": skill,
                            })
                        })
                        .collect();
                    json!({ "number": m, "title": format!("Module {}", m), "exercises": exercises })
                })
                .collect();
            levels.insert(level.to_string(), json!({ "modules": modules }));
        }

        let placement: Vec<Value> = (1..=config.placement_question_count)
            .map(|q| json!({ "id": format!("p{}", q), "prompt": "?", "answers": [format!("p{}", q)] }))
            .collect();

        json!({ "placement_test": placement, "levels": levels })
    }

    pub(crate) fn sample_catalog(config: &EngineConfig) -> Catalog {
        Catalog::from_json(&sample_source(config).to_string(), config).unwrap()
    }

    #[test]
    fn test_load_valid_catalog() {
        let config = EngineConfig::default();
        let catalog = sample_catalog(&config);

        assert_eq!(catalog.module_count(), 36);
        assert_eq!(catalog.placement_questions().len(), 15);

        let exercise = catalog.exercise(&Level::new("A2"), 12, 5).unwrap();
        assert_eq!(exercise.id, "A2-12-5");
        assert!(exercise.check("ANSWER a2-12-5"));
    }

    #[test]
    fn test_out_of_range_lookups() {
        let config = EngineConfig::default();
        let catalog = sample_catalog(&config);
        let a1 = Level::new("A1");

        assert!(matches!(catalog.exercise(&a1, 0, 1), Err(CoreError::NotFound(_))));
        assert!(matches!(catalog.exercise(&a1, 13, 1), Err(CoreError::NotFound(_))));
        assert!(matches!(catalog.exercise(&a1, 1, 6), Err(CoreError::NotFound(_))));
        assert!(matches!(
            catalog.exercise(&Level::new("C2"), 1, 1),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_detects_moved_content() {
        let config = EngineConfig::default();
        let catalog = sample_catalog(&config);
        let mut reference = catalog.exercise_ref(&Level::new("A1"), 2, 3).unwrap();
        assert!(catalog.resolve(&reference).is_ok());

        reference.exercise_id = "renamed".to_string();
        assert!(matches!(catalog.resolve(&reference), Err(CoreError::NotFound(_))));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let config = EngineConfig::default();
        let result = Catalog::from_json("{ not json", &config);
        assert!(matches!(result, Err(CoreError::CatalogLoad(_))));
    }

    #[test]
    fn test_exercise_count_mismatch_is_rejected() {
        let config = EngineConfig::default();
        let mut source = sample_source(&config);
        source["levels"]["A1"]["modules"][3]["exercises"]
            .as_array_mut()
            .unwrap()
            .pop();

        let result = Catalog::from_json(&source.to_string(), &config);
        assert!(matches!(result, Err(CoreError::CatalogLoad(_))));
    }

    #[test]
    fn test_missing_level_is_rejected() {
        let config = EngineConfig::default();
        let mut source = sample_source(&config);
        source["levels"].as_object_mut().unwrap().remove("B1");

        let result = Catalog::from_json(&source.to_string(), &config);
        assert!(matches!(result, Err(CoreError::CatalogLoad(_))));
    }

    #[test]
    fn test_duplicate_module_is_rejected() {
        let config = EngineConfig::default();
        let mut source = sample_source(&config);
        source["levels"]["A2"]["modules"][1]["number"] = json!(1);

        let result = Catalog::from_json(&source.to_string(), &config);
        assert!(matches!(result, Err(CoreError::CatalogLoad(_))));
    }

    #[test]
    fn test_placement_length_must_match() {
        let config = EngineConfig::default();
        let mut source = sample_source(&config);
        source["placement_test"].as_array_mut().unwrap().pop();

        let result = Catalog::from_json(&source.to_string(), &config);
        assert!(matches!(result, Err(CoreError::CatalogLoad(_))));
    }

    #[test]
    fn test_empty_answers_are_rejected() {
        let config = EngineConfig::default();
        let mut source = sample_source(&config);
        source["levels"]["A1"]["modules"][0]["exercises"][0]["answers"] = json!(["  "]);

        let result = Catalog::from_json(&source.to_string(), &config);
        assert!(matches!(result, Err(CoreError::CatalogLoad(_))));
    }
}
