use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::StorageResult;

/// Storage backend selection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageConfig {
    /// One JSON file per user under the users directory
    #[default]
    File,
    /// Process-local map, lost on exit
    Memory,
    /// PostgreSQL table
    Postgres { database_url: String },
}

/// Storage trait for abstract file operations
#[async_trait]
pub trait Storage: Send + Sync {
    /// Check if a path exists
    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Read file contents
    async fn read(&self, path: &str) -> StorageResult<Vec<u8>>;

    /// Write file contents
    async fn write(&self, path: &str, content: &[u8]) -> StorageResult<()>;

    /// Delete a file
    async fn delete(&self, path: &str) -> StorageResult<()>;

    /// Move file from source to destination, replacing the destination
    async fn rename(&self, source: &str, destination: &str) -> StorageResult<()>;
}
