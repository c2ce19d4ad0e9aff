//! Placement test scoring
//!
//! A raw score is mapped to a level through the configured
//! [`PlacementBand`](crate::PlacementBand)s. Inside a band the starting
//! module moves forward with the score, so the whole mapping is monotonic:
//! a higher score never yields an earlier (level, module).

use crate::{CoreError, EngineConfig, Level, PlacementQuestion, Result};
use serde::{Deserialize, Serialize};

/// Outcome of a finished placement test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementResult {
    pub correct: usize,
    pub total: usize,
    pub ratio: f64,
    pub level: Level,
    pub module: u8,
}

/// Scores placement tests
#[derive(Debug, Clone)]
pub struct PlacementEvaluator {
    config: EngineConfig,
}

impl PlacementEvaluator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Grade a complete test
    pub fn evaluate(&self, responses: &[(&PlacementQuestion, &str)]) -> Result<PlacementResult> {
        if responses.len() != self.config.placement_question_count {
            return Err(CoreError::InvalidInput(format!(
                "placement test needs {} answers, got {}",
                self.config.placement_question_count,
                responses.len()
            )));
        }

        let correct = responses
            .iter()
            .filter(|(question, answer)| question.check(answer))
            .count();
        self.place(correct)
    }

    /// Map a raw score to a starting position
    pub fn place(&self, correct: usize) -> Result<PlacementResult> {
        let total = self.config.placement_question_count;
        if correct > total {
            return Err(CoreError::InvalidInput(format!(
                "score {} exceeds the {} placement questions",
                correct, total
            )));
        }

        let ratio = correct as f64 / total as f64;
        let bands = &self.config.placement_bands;
        let band_index = bands
            .iter()
            .rposition(|band| band.min_ratio <= ratio)
            .ok_or_else(|| {
                CoreError::InvalidConfig("no placement band covers a score of 0".to_string())
            })?;
        let band = &bands[band_index];

        let upper = bands.get(band_index + 1).map_or(1.0, |next| next.min_ratio);
        let width = upper - band.min_ratio;
        let offset = if width <= 0.0 {
            band.max_module_offset
        } else {
            let position = (ratio - band.min_ratio) / width;
            let steps = f64::from(band.max_module_offset) + 1.0;
            ((position * steps).floor() as u8).min(band.max_module_offset)
        };

        Ok(PlacementResult {
            correct,
            total,
            ratio,
            level: band.level.clone(),
            module: 1 + offset,
        })
    }
}
