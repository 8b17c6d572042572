use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::ListingFeeConfig;

/// Publication status. `Expired` is never stored; it is projected from
/// `expires_at` at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Pending,
    Active,
    Rejected,
    Expired,
}

/// Shared by payments and by the listing's payment axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "pay_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PayStatus {
    Pending,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Listing {
    pub id: Uuid,
    pub user_id: Uuid,
    pub anonimax_id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub state: Option<String>,
    pub status: ListingStatus,
    pub payment_status: PayStatus,
    pub expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub anonimax_id: String,
    pub listing_id: Option<Uuid>,
    pub amount: f64,
    pub currency: String,
    pub network: String,
    pub tx_hash: Option<String>,
    pub status: PayStatus,
    pub created_at: OffsetDateTime,
    pub verified_at: Option<OffsetDateTime>,
}

pub struct NewListing<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub category: &'a str,
    pub state: Option<&'a str>,
}

const LISTING_COLUMNS: &str = "id, user_id, anonimax_id, title, content, category, state, \
                               status, payment_status, expires_at, created_at, updated_at";

const PAYMENT_COLUMNS: &str = "id, user_id, anonimax_id, listing_id, amount, currency, \
                               network, tx_hash, status, created_at, verified_at";

impl Listing {
    /// Status as a reader should see it: an active listing past its expiry
    /// is expired, even though the row still says `active`.
    pub fn effective_status(&self, now: OffsetDateTime) -> ListingStatus {
        match (self.status, self.expires_at) {
            (ListingStatus::Active, Some(expires)) if expires <= now => ListingStatus::Expired,
            (status, _) => status,
        }
    }

    /// Creates the listing and its fee payment stub in one transaction.
    /// A listing without a payment record (or vice versa) must never exist.
    pub async fn create_with_payment(
        db: &PgPool,
        user_id: Uuid,
        anonimax_id: &str,
        new: NewListing<'_>,
        fee: &ListingFeeConfig,
    ) -> anyhow::Result<(Listing, Payment)> {
        let mut tx = db.begin().await?;

        let listing = sqlx::query_as::<_, Listing>(&format!(
            "INSERT INTO listings (user_id, anonimax_id, title, content, category, state)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {LISTING_COLUMNS}"
        ))
        .bind(user_id)
        .bind(anonimax_id)
        .bind(new.title)
        .bind(new.content)
        .bind(new.category)
        .bind(new.state)
        .fetch_one(&mut *tx)
        .await?;

        let payment = sqlx::query_as::<_, Payment>(&format!(
            "INSERT INTO payments (user_id, anonimax_id, listing_id, amount, currency, network)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(user_id)
        .bind(anonimax_id)
        .bind(listing.id)
        .bind(fee.amount)
        .bind(&fee.currency)
        .bind(&fee.network)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((listing, payment))
    }

    /// Active listings only, lazily excluding expired rows. Free-text search
    /// is applied by the caller after this query.
    pub async fn list_active(
        db: &PgPool,
        state: Option<&str>,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Listing>> {
        let rows = sqlx::query_as::<_, Listing>(&format!(
            "SELECT {LISTING_COLUMNS}
             FROM listings
             WHERE status = 'active'
               AND (expires_at IS NULL OR expires_at > now())
               AND ($1::text IS NULL OR state = $1)
               AND ($2::text IS NULL OR category = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        ))
        .bind(state)
        .bind(category)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Listing>> {
        let rows = sqlx::query_as::<_, Listing>(&format!(
            "SELECT {LISTING_COLUMNS}
             FROM listings
             WHERE user_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Listing>> {
        let row = sqlx::query_as::<_, Listing>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Admin view: newest first, optional status filter, capped at 100.
    pub async fn list_for_admin(
        db: &PgPool,
        status: Option<ListingStatus>,
    ) -> anyhow::Result<Vec<Listing>> {
        let rows = sqlx::query_as::<_, Listing>(&format!(
            "SELECT {LISTING_COLUMNS}
             FROM listings
             WHERE ($1::listing_status IS NULL OR status = $1)
             ORDER BY created_at DESC
             LIMIT 100"
        ))
        .bind(status)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn set_status(
        db: &PgPool,
        id: Uuid,
        status: ListingStatus,
        expires_at: Option<OffsetDateTime>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE listings
             SET status = $2, expires_at = COALESCE($3, expires_at), updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(expires_at)
        .execute(db)
        .await?;
        Ok(())
    }
}

impl Payment {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Payment>> {
        let row = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn find_pending_for_listing(
        db: &PgPool,
        listing_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Payment>> {
        let row = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS}
             FROM payments
             WHERE listing_id = $1 AND user_id = $2 AND status = 'pending'"
        ))
        .bind(listing_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Records the payer's transaction hash. Status is untouched; only an
    /// admin verification moves it.
    pub async fn attach_tx_hash(db: &PgPool, id: Uuid, tx_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE payments SET tx_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(tx_hash)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn list_for_admin(
        db: &PgPool,
        status: Option<PayStatus>,
    ) -> anyhow::Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS}
             FROM payments
             WHERE ($1::pay_status IS NULL OR status = $1)
             ORDER BY created_at DESC
             LIMIT 100"
        ))
        .bind(status)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Marks this payment verified and activates the linked listing, as one
    /// transaction. A verified payment with a still-pending listing must
    /// never be observable.
    pub async fn mark_verified(
        &self,
        db: &PgPool,
        now: OffsetDateTime,
        listing_expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        let mut tx = db.begin().await?;

        sqlx::query("UPDATE payments SET status = 'verified', verified_at = $2 WHERE id = $1")
            .bind(self.id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        if let Some(listing_id) = self.listing_id {
            sqlx::query(
                "UPDATE listings
                 SET status = 'active', payment_status = 'verified',
                     expires_at = $2, updated_at = now()
                 WHERE id = $1",
            )
            .bind(listing_id)
            .bind(listing_expires_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Marks this payment rejected. The linked listing keeps its status;
    /// only its payment axis moves.
    pub async fn mark_rejected(&self, db: &PgPool) -> anyhow::Result<()> {
        let mut tx = db.begin().await?;

        sqlx::query("UPDATE payments SET status = 'rejected' WHERE id = $1")
            .bind(self.id)
            .execute(&mut *tx)
            .await?;

        if let Some(listing_id) = self.listing_id {
            sqlx::query(
                "UPDATE listings
                 SET payment_status = 'rejected', updated_at = now()
                 WHERE id = $1",
            )
            .bind(listing_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn listing_with(status: ListingStatus, expires_at: Option<OffsetDateTime>) -> Listing {
        let now = OffsetDateTime::now_utc();
        Listing {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            anonimax_id: "ANX-TEST-0001".into(),
            title: "Título de teste".into(),
            content: "Conteúdo de teste com tamanho suficiente".into(),
            category: "services".into(),
            state: None,
            status,
            payment_status: PayStatus::Pending,
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn active_listing_past_expiry_reads_as_expired() {
        let now = OffsetDateTime::now_utc();
        let listing = listing_with(ListingStatus::Active, Some(now - Duration::seconds(1)));
        assert_eq!(listing.effective_status(now), ListingStatus::Expired);
    }

    #[test]
    fn active_listing_before_expiry_stays_active() {
        let now = OffsetDateTime::now_utc();
        let listing = listing_with(ListingStatus::Active, Some(now + Duration::days(10)));
        assert_eq!(listing.effective_status(now), ListingStatus::Active);
    }

    #[test]
    fn expiry_projection_only_applies_to_active_rows() {
        let now = OffsetDateTime::now_utc();
        let listing = listing_with(ListingStatus::Pending, Some(now - Duration::days(1)));
        assert_eq!(listing.effective_status(now), ListingStatus::Pending);
        let rejected = listing_with(ListingStatus::Rejected, None);
        assert_eq!(rejected.effective_status(now), ListingStatus::Rejected);
    }
}
