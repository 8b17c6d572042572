use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo::User;

#[derive(Debug)]
pub struct PlatformStats {
    pub total_users: i64,
    pub verified_users: i64,
    pub total_listings: i64,
    pub active_listings: i64,
    pub pending_listings: i64,
    pub pending_payments: i64,
    pub verified_payments: i64,
    pub total_revenue: f64,
}

pub async fn platform_stats(db: &PgPool) -> anyhow::Result<PlatformStats> {
    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    let verified_users: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_verified")
            .fetch_one(db)
            .await?;
    let total_listings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings")
        .fetch_one(db)
        .await?;
    let active_listings: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM listings WHERE status = 'active'")
            .fetch_one(db)
            .await?;
    let pending_listings: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM listings WHERE status = 'pending'")
            .fetch_one(db)
            .await?;
    let pending_payments: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE status = 'pending'")
            .fetch_one(db)
            .await?;
    let verified_payments: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE status = 'verified'")
            .fetch_one(db)
            .await?;
    let total_revenue: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE status = 'verified'",
    )
    .fetch_one(db)
    .await?;

    Ok(PlatformStats {
        total_users,
        verified_users,
        total_listings,
        active_listings,
        pending_listings,
        pending_payments,
        verified_payments,
        total_revenue,
    })
}

pub async fn list_recent_users(db: &PgPool) -> anyhow::Result<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, anonimax_id, is_verified, is_admin,
                verification_token, reset_token, reset_token_expires,
                created_at, updated_at
         FROM users
         ORDER BY created_at DESC
         LIMIT 100",
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Removes everything the user owns, then the user, in one transaction.
/// Returns false when the user does not exist. The schema's cascading
/// foreign keys back this up, but the deletes are explicit so the operation
/// reads as what it is.
pub async fn delete_user_cascade(db: &PgPool, user_id: Uuid) -> anyhow::Result<bool> {
    let mut tx = db.begin().await?;

    let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    if exists == 0 {
        return Ok(false);
    }

    sqlx::query("DELETE FROM favorites WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM payments WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM listings WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}
