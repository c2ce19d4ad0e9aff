use async_trait::async_trait;
use lingua_core::{UserId, UserProfile};
use std::sync::Arc;
use tracing::debug;

use super::{ProfileError, ProfileRepository, ProfileResult};
use crate::config::LinguaConfig;
use crate::storage::{LocalStorage, Storage, StorageError};

/// One JSON document per learner, `{users_dir}/{user_id}.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous profile intact.
#[derive(Clone)]
pub struct FileProfileRepository {
    storage: Arc<dyn Storage>,
    users_dir: String,
}

impl FileProfileRepository {
    pub fn new(storage: Arc<dyn Storage>, users_dir: impl Into<String>) -> Self {
        Self {
            storage,
            users_dir: users_dir.into(),
        }
    }

    /// Profiles under `{data_dir}/{users_dir}` on the local filesystem
    pub fn from_config(config: &LinguaConfig) -> Self {
        Self::new(
            Arc::new(LocalStorage::from_config(config)),
            config.users_dir.clone(),
        )
    }

    fn path_for(&self, user_id: &UserId) -> ProfileResult<String> {
        let id = user_id.as_str();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ProfileError::InvalidId(id.to_string()));
        }
        Ok(format!("{}/{}.json", self.users_dir, id))
    }
}

#[async_trait]
impl ProfileRepository for FileProfileRepository {
    async fn load(&self, user_id: &UserId) -> ProfileResult<Option<UserProfile>> {
        let path = self.path_for(user_id)?;
        match self.storage.read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, profile: &UserProfile) -> ProfileResult<()> {
        let path = self.path_for(&profile.user_id)?;
        let tmp = format!("{}.tmp", path);
        let bytes = serde_json::to_vec_pretty(profile)?;

        self.storage.write(&tmp, &bytes).await?;
        self.storage.rename(&tmp, &path).await?;
        debug!(user_id = %profile.user_id, path = %path, "Profile saved");
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> ProfileResult<()> {
        let path = self.path_for(user_id)?;
        self.storage.delete(&path).await.map_err(|e| match e {
            StorageError::NotFound(_) => ProfileError::NotFound(user_id.to_string()),
            other => other.into(),
        })
    }

    async fn exists(&self, user_id: &UserId) -> ProfileResult<bool> {
        let path = self.path_for(user_id)?;
        Ok(self.storage.exists(&path).await?)
    }
}
