use async_trait::async_trait;
use lingua_core::{UserId, UserProfile};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ProfileError, ProfileRepository, ProfileResult};

/// In-memory implementation of ProfileRepository for testing and development
#[derive(Clone, Default)]
pub struct InMemoryProfileRepository {
    profiles: Arc<RwLock<HashMap<UserId, UserProfile>>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles
    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn load(&self, user_id: &UserId) -> ProfileResult<Option<UserProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(user_id).cloned())
    }

    async fn save(&self, profile: &UserProfile) -> ProfileResult<()> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> ProfileResult<()> {
        let mut profiles = self.profiles.write().await;
        profiles
            .remove(user_id)
            .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))?;
        Ok(())
    }

    async fn exists(&self, user_id: &UserId) -> ProfileResult<bool> {
        let profiles = self.profiles.read().await;
        Ok(profiles.contains_key(user_id))
    }
}
