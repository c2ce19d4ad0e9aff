//! Error types for lingua crate

use thiserror::Error;

use crate::dialogue::DialogueError;
use crate::profile::ProfileError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum LinguaError {
    #[error("Core error: {0}")]
    Core(#[from] lingua_core::CoreError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Dialogue error: {0}")]
    Dialogue(#[from] DialogueError),

    #[error("Build error: {0}")]
    Build(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl LinguaError {
    /// Unknown user, exercise or module
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LinguaError::Core(lingua_core::CoreError::NotFound(_))
                | LinguaError::Profile(ProfileError::NotFound(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, LinguaError>;
