use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub anonimax_id: String,
    pub session_id: Option<String>,
    pub crypto_type: Option<String>,
    pub crypto_network: Option<String>,
    pub crypto_address: Option<String>,
    pub state: Option<String>,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_anonimax_id: String,
    pub custom_name: Option<String>,
    pub custom_description: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Partial update; None leaves the column untouched.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub session_id: Option<String>,
    pub crypto_type: Option<String>,
    pub crypto_network: Option<String>,
    pub crypto_address: Option<String>,
    pub state: Option<String>,
    pub description: Option<String>,
}

const PROFILE_COLUMNS: &str = "id, user_id, anonimax_id, session_id, crypto_type, \
                               crypto_network, crypto_address, state, description, \
                               created_at, updated_at";

const FAVORITE_COLUMNS: &str =
    "id, user_id, target_anonimax_id, custom_name, custom_description, created_at";

impl Profile {
    pub async fn find_by_user_id(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let row = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn find_by_anonimax_id(
        db: &PgPool,
        anonimax_id: &str,
    ) -> anyhow::Result<Option<Profile>> {
        let row = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE anonimax_id = $1"
        ))
        .bind(anonimax_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn apply_changes(
        db: &PgPool,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE profiles
             SET session_id = COALESCE($2, session_id),
                 crypto_type = COALESCE($3, crypto_type),
                 crypto_network = COALESCE($4, crypto_network),
                 crypto_address = COALESCE($5, crypto_address),
                 state = COALESCE($6, state),
                 description = COALESCE($7, description),
                 updated_at = now()
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(&changes.session_id)
        .bind(&changes.crypto_type)
        .bind(&changes.crypto_network)
        .bind(&changes.crypto_address)
        .bind(&changes.state)
        .bind(&changes.description)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Directory view: only profiles that published a contact handle.
    pub async fn list_contactable(
        db: &PgPool,
        state: Option<&str>,
    ) -> anyhow::Result<Vec<Profile>> {
        let rows = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS}
             FROM profiles
             WHERE session_id IS NOT NULL
               AND ($1::text IS NULL OR state = $1)
             ORDER BY created_at DESC
             LIMIT 100"
        ))
        .bind(state)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

impl Favorite {
    pub async fn exists(
        db: &PgPool,
        user_id: Uuid,
        target_anonimax_id: &str,
    ) -> anyhow::Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM favorites WHERE user_id = $1 AND target_anonimax_id = $2",
        )
        .bind(user_id)
        .bind(target_anonimax_id)
        .fetch_one(db)
        .await?;
        Ok(count > 0)
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        target_anonimax_id: &str,
        custom_name: Option<&str>,
        custom_description: Option<&str>,
    ) -> anyhow::Result<Favorite> {
        let row = sqlx::query_as::<_, Favorite>(&format!(
            "INSERT INTO favorites (user_id, target_anonimax_id, custom_name, custom_description)
             VALUES ($1, $2, $3, $4)
             RETURNING {FAVORITE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(target_anonimax_id)
        .bind(custom_name)
        .bind(custom_description)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Favorite>> {
        let rows = sqlx::query_as::<_, Favorite>(&format!(
            "SELECT {FAVORITE_COLUMNS}
             FROM favorites
             WHERE user_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Ownership is part of the predicate: deleting someone else's favorite
    /// looks the same as deleting one that never existed.
    pub async fn delete_owned(db: &PgPool, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
