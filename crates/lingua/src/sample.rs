//! Starter curriculum written by `lingua init`
//!
//! Small generated content that satisfies any valid [`EngineConfig`], so a
//! fresh install runs end to end before real lessons are authored.

use lingua_core::{Catalog, EngineConfig};
use serde_json::{Value, json};

use crate::error::Result;

const NOUNS: &[(&str, &str)] = &[
    ("cat", "cats"),
    ("box", "boxes"),
    ("child", "children"),
    ("mouse", "mice"),
    ("city", "cities"),
    ("knife", "knives"),
    ("tooth", "teeth"),
    ("bus", "buses"),
    ("man", "men"),
    ("leaf", "leaves"),
    ("foot", "feet"),
    ("baby", "babies"),
    ("woman", "women"),
    ("watch", "watches"),
    ("sheep", "sheep"),
    ("potato", "potatoes"),
    ("wolf", "wolves"),
    ("person", "people"),
    ("story", "stories"),
    ("fish", "fish"),
];

const BE_SENTENCES: &[(&str, &str)] = &[
    ("I ___ a student.", "am"),
    ("She ___ at school now.", "is"),
    ("They ___ my friends.", "are"),
    ("We ___ in the park.", "are"),
    ("It ___ cold today.", "is"),
    ("You ___ very kind.", "are"),
    ("My brother ___ ten years old.", "is"),
    ("The books ___ on the table.", "are"),
];

const PAST_SENTENCES: &[(&str, &str)] = &[
    ("Yesterday I ___ (go) to the cinema.", "went"),
    ("She ___ (see) a big dog.", "saw"),
    ("We ___ (have) pizza for dinner.", "had"),
    ("He ___ (write) a letter.", "wrote"),
    ("They ___ (buy) new bikes.", "bought"),
    ("I ___ (make) a cake.", "made"),
    ("The film ___ (begin) at six.", "began"),
    ("You ___ (take) my pen!", "took"),
];

const PLACEMENT: &[(&str, &str, &[&str])] = &[
    ("Choose: I ___ twelve years old.", "am", &["am", "is", "are"]),
    ("Choose: They ___ from Spain.", "are", &["is", "are", "be"]),
    ("Plural of \"child\"?", "children", &["childs", "children", "childes"]),
    ("Choose: She ___ tennis every Sunday.", "plays", &["play", "plays", "playing"]),
    ("Choose: ___ you like apples?", "do", &["do", "does", "are"]),
    ("Choose: There ___ two cats in the garden.", "are", &["is", "are", "am"]),
    ("Past of \"go\"?", "went", &["goed", "went", "gone"]),
    ("Choose: He is ___ than his sister.", "taller", &["tall", "taller", "tallest"]),
    ("Choose: I ___ TV when you called.", "was watching", &["watched", "was watching", "am watching"]),
    ("Choose: We have lived here ___ 2015.", "since", &["for", "since", "from"]),
    ("Choose: If it rains, we ___ at home.", "will stay", &["stay", "will stay", "stayed"]),
    ("Choose: This is the ___ book I have ever read.", "best", &["good", "better", "best"]),
    ("Choose: She has ___ finished her homework.", "already", &["yet", "already", "still"]),
    ("Choose: The letter ___ yesterday.", "was sent", &["sent", "was sent", "has sent"]),
    ("Choose: You ___ wear a helmet on a bike.", "should", &["should", "would", "could"]),
];

/// Curriculum document shaped by `config`
pub fn sample_curriculum(config: &EngineConfig) -> Value {
    let mut levels = serde_json::Map::new();
    let mut counter = 0usize;

    for (rank, level) in config.levels.iter().enumerate() {
        let modules: Vec<Value> = (1..=config.modules_per_level)
            .map(|m| {
                let exercises: Vec<Value> = (1..=config.exercises_per_module)
                    .map(|e| {
                        let id = format!("{}-{:02}-{}", level, m, e);
                        let exercise = exercise(&id, rank, e, counter);
                        counter += 1;
                        exercise
                    })
                    .collect();
                json!({
                    "number": m,
                    "title": format!("{} Unit {}", level, m),
                    "exercises": exercises,
                })
            })
            .collect();
        levels.insert(level.to_string(), json!({ "modules": modules }));
    }

    let placement: Vec<Value> = (0..config.placement_question_count)
        .map(|i| {
            let (prompt, answer, options) = PLACEMENT[i % PLACEMENT.len()];
            json!({
                "id": format!("placement-{}", i + 1),
                "prompt": prompt,
                "answers": [answer],
                "options": options,
            })
        })
        .collect();

    json!({ "placement_test": placement, "levels": levels })
}

fn exercise(id: &str, level_rank: usize, index: u8, counter: usize) -> Value {
    let difficulty = (level_rank + 1).min(5);
    if index % 2 == 1 {
        let (singular, plural) = NOUNS[counter % NOUNS.len()];
        json!({
            "id": id,
            "prompt": format!("Write the plural of \"{}\".", singular),
            "answers": [plural],
            "vocabulary": [plural],
            "skill": "vocabulary",
            "difficulty": difficulty,
        })
    } else {
        let bank = if level_rank == 0 { BE_SENTENCES } else { PAST_SENTENCES };
        let (sentence, answer) = bank[counter % bank.len()];
        json!({
            "id": id,
            "prompt": format!("Fill in the gap: {}", sentence),
            "answers": [answer],
            "skill": "grammar",
            "difficulty": difficulty,
        })
    }
}

/// Validated catalog built from [`sample_curriculum`]
pub fn sample_catalog(config: &EngineConfig) -> Result<Catalog> {
    let json = sample_curriculum(config).to_string();
    Ok(Catalog::from_json(&json, config)?)
}
