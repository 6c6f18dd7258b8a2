use crate::profile::repo_types::{ProfileDoc, ProfileRecord};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

impl ProfileRecord {
    /// Load a user's profile document.
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<ProfileRecord>> {
        let profile = sqlx::query_as::<_, ProfileRecord>(
            r#"
            SELECT user_id, data, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// Create the empty profile that accompanies a fresh user. Generic over the
    /// executor so it can share the registration transaction.
    pub async fn create<'e, E>(
        db: E,
        user_id: Uuid,
        name: &str,
        email: &str,
    ) -> anyhow::Result<ProfileRecord>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let doc = ProfileDoc::new(name, email);
        let profile = sqlx::query_as::<_, ProfileRecord>(
            r#"
            INSERT INTO profiles (user_id, data)
            VALUES ($1, $2)
            RETURNING user_id, data, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(Json(doc))
        .fetch_one(db)
        .await?;
        Ok(profile)
    }

    /// Replace the stored document wholesale. Last write wins.
    pub async fn save(
        db: &PgPool,
        user_id: Uuid,
        doc: &ProfileDoc,
    ) -> anyhow::Result<Option<ProfileRecord>> {
        let profile = sqlx::query_as::<_, ProfileRecord>(
            r#"
            UPDATE profiles
            SET data = $2, updated_at = now()
            WHERE user_id = $1
            RETURNING user_id, data, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(Json(doc))
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }
}
