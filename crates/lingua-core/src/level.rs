//! Proficiency tiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// NewType pattern for a proficiency level (e.g. "A1")
///
/// Ordering between levels is defined by [`crate::EngineConfig::levels`],
/// never by the string itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(String);

impl Level {
    /// Create a level from its code
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the level code
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Level {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
