use async_trait::async_trait;
use lingua_core::{UserId, UserProfile};
use sqlx::{Row, postgres::PgPool};

use super::{ProfileError, ProfileRepository, ProfileResult};

/// PostgreSQL implementation of ProfileRepository.
///
/// The whole profile is stored as JSONB; `display_name` and `stage` are
/// duplicated into columns for ad-hoc queries.
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    /// Create a new PostgresProfileRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and run pending migrations
    pub async fn connect(database_url: &str) -> ProfileResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;
        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn load(&self, user_id: &UserId) -> ProfileResult<Option<UserProfile>> {
        let row = sqlx::query(
            r#"
            SELECT profile
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => {
                let json: serde_json::Value = row.get("profile");
                Ok(Some(serde_json::from_value(json)?))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, profile: &UserProfile) -> ProfileResult<()> {
        let json = serde_json::to_value(profile)?;

        sqlx::query(
            r#"
            INSERT INTO user_profiles (
                user_id, display_name, stage, profile, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6
            )
            ON CONFLICT (user_id) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                stage = EXCLUDED.stage,
                profile = EXCLUDED.profile,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(profile.user_id.as_str())
        .bind(&profile.display_name)
        .bind(profile.stage.to_string())
        .bind(json)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> ProfileResult<()> {
        let result = sqlx::query("DELETE FROM user_profiles WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ProfileError::NotFound(user_id.to_string()));
        }

        Ok(())
    }

    async fn exists(&self, user_id: &UserId) -> ProfileResult<bool> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(SELECT 1 FROM user_profiles WHERE user_id = $1) as exists
            "#,
        )
        .bind(user_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        Ok(row.get("exists"))
    }
}
