use async_trait::async_trait;
use lingua_core::{UserId, UserProfile};

use super::ProfileResult;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Get a profile, `None` for unknown users
    async fn load(&self, user_id: &UserId) -> ProfileResult<Option<UserProfile>>;

    /// Insert or replace a profile
    async fn save(&self, profile: &UserProfile) -> ProfileResult<()>;

    /// Delete a profile
    async fn delete(&self, user_id: &UserId) -> ProfileResult<()>;

    /// Check if a profile exists
    async fn exists(&self, user_id: &UserId) -> ProfileResult<bool> {
        Ok(self.load(user_id).await?.is_some())
    }
}
