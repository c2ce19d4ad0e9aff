use thiserror::Error;

use crate::profile::ProfileError;

#[derive(Error, Debug)]
pub enum DialogueError {
    #[error("Empty message")]
    EmptyMessage,

    #[error("Assistant error: {0}")]
    Assistant(#[from] lingua_core::CoreError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),
}

pub type DialogueResult<T> = Result<T, DialogueError>;
