//! Engine configuration
//!
//! All thresholds and counts are carried by one immutable [`EngineConfig`]
//! value that is handed to each component at construction.

use crate::{CoreError, Level, Result};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Configuration surface consumed by the curriculum engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ordered proficiency tiers, lowest first
    pub levels: Vec<Level>,

    /// Number of modules in every level
    pub modules_per_level: u8,

    /// Number of exercises in every module
    pub exercises_per_module: u8,

    /// Mastery ratio at or below which a module is repeated
    pub error_threshold: f64,

    /// Mastery ratio at or above which a module is fast-tracked
    pub excellent_threshold: f64,

    /// Length of the placement test
    pub placement_question_count: usize,

    /// Score breakpoints for the placement test, lowest first
    pub placement_bands: Vec<PlacementBand>,

    /// Maximum number of entries in a user's retry buffer
    pub retry_buffer_capacity: usize,

    /// Retry items interleaved at the start of a session
    pub retry_exercises_per_session: usize,

    /// Which entry to drop when the retry buffer is full
    pub retry_eviction: EvictionPolicy,

    /// Extra modules skipped on a fast-track (never crosses a level)
    pub fast_track_extra_modules: u8,
}

/// One placement breakpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementBand {
    /// Level assigned to scores in this band
    pub level: Level,
    /// Lowest score ratio (inclusive) that falls into this band
    pub min_ratio: f64,
    /// Highest module offset reachable inside the band (0 = always module 1)
    #[serde(default)]
    pub max_module_offset: u8,
}

/// Retry buffer eviction policy
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EvictionPolicy {
    /// Drop the entry with the fewest misses, oldest first among equals
    #[default]
    LowestPriority,
    /// Drop the entry that was seen longest ago
    Oldest,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            levels: vec![Level::new("A1"), Level::new("A2"), Level::new("B1")],
            modules_per_level: 12,
            exercises_per_module: 5,
            error_threshold: 0.5,
            excellent_threshold: 0.9,
            placement_question_count: 15,
            placement_bands: vec![
                PlacementBand {
                    level: Level::new("A1"),
                    min_ratio: 0.0,
                    max_module_offset: 0,
                },
                PlacementBand {
                    level: Level::new("A2"),
                    min_ratio: 0.4,
                    max_module_offset: 2,
                },
                PlacementBand {
                    level: Level::new("B1"),
                    min_ratio: 0.7,
                    max_module_offset: 2,
                },
            ],
            retry_buffer_capacity: 10,
            retry_exercises_per_session: 2,
            retry_eviction: EvictionPolicy::LowestPriority,
            fast_track_extra_modules: 0,
        }
    }
}

impl EngineConfig {
    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.levels.is_empty() {
            return Err(invalid("at least one level is required"));
        }
        for (i, level) in self.levels.iter().enumerate() {
            if self.levels[..i].contains(level) {
                return Err(invalid(format!("duplicate level {}", level)));
            }
        }
        if self.modules_per_level == 0 {
            return Err(invalid("modules_per_level must be positive"));
        }
        if self.exercises_per_module == 0 {
            return Err(invalid("exercises_per_module must be positive"));
        }
        for (name, value) in [
            ("error_threshold", self.error_threshold),
            ("excellent_threshold", self.excellent_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{} must be within [0, 1]", name)));
            }
        }
        if self.error_threshold >= self.excellent_threshold {
            return Err(invalid(
                "error_threshold must be lower than excellent_threshold",
            ));
        }
        if self.placement_question_count == 0 {
            return Err(invalid("placement_question_count must be positive"));
        }
        if self.retry_buffer_capacity == 0 {
            return Err(invalid("retry_buffer_capacity must be positive"));
        }
        if self.fast_track_extra_modules >= self.modules_per_level {
            return Err(invalid(
                "fast_track_extra_modules must be lower than modules_per_level",
            ));
        }
        self.validate_bands()
    }

    fn validate_bands(&self) -> Result<()> {
        let first = self
            .placement_bands
            .first()
            .ok_or_else(|| invalid("at least one placement band is required"))?;
        if first.min_ratio != 0.0 {
            return Err(invalid("the first placement band must start at 0.0"));
        }

        let mut previous: Option<(&PlacementBand, usize)> = None;
        for band in &self.placement_bands {
            let rank = self
                .level_index(&band.level)
                .ok_or_else(|| invalid(format!("placement band uses unknown level {}", band.level)))?;
            if !(0.0..=1.0).contains(&band.min_ratio) {
                return Err(invalid("placement band min_ratio must be within [0, 1]"));
            }
            if band.max_module_offset >= self.modules_per_level {
                return Err(invalid(format!(
                    "placement band {} offset exceeds the module count",
                    band.level
                )));
            }
            if let Some((prev, prev_rank)) = previous {
                if band.min_ratio <= prev.min_ratio || rank <= prev_rank {
                    return Err(invalid(
                        "placement bands must be strictly increasing in score and level",
                    ));
                }
            }
            previous = Some((band, rank));
        }
        Ok(())
    }

    /// Position of a level in the ordered level set
    pub fn level_index(&self, level: &Level) -> Option<usize> {
        self.levels.iter().position(|l| l == level)
    }

    /// The tier directly above `level`, if any
    pub fn next_level(&self, level: &Level) -> Option<&Level> {
        self.level_index(level)
            .and_then(|i| self.levels.get(i + 1))
    }

    /// Lowest tier
    pub fn lowest_level(&self) -> Option<&Level> {
        self.levels.first()
    }

    /// Whether `level` is the top tier
    pub fn is_top_level(&self, level: &Level) -> bool {
        self.levels.last() == Some(level)
    }

    /// Retry items to interleave in one session
    pub fn retry_items_for(&self, emphasis: bool) -> usize {
        if emphasis {
            self.retry_exercises_per_session * 2
        } else {
            self.retry_exercises_per_session
        }
    }
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::InvalidConfig(message.into())
}
