//! Error types for lingua-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Catalog load error: {0}")]
    CatalogLoad(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Assistant error: {0}")]
    Assistant(String),
}

impl CoreError {
    /// Whether the session loop can recover by reinitialising or reporting
    /// missing content.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CoreError::NotFound(_) | CoreError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
