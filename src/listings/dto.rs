use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::ListingFeeConfig;
use crate::listings::repo::{Listing, ListingStatus, PayStatus, Payment};
use crate::profiles::dto::PublicProfile;

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub content: String,
    pub category: String,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitPaymentRequest {
    pub listing_id: Uuid,
    pub tx_hash: String,
}

#[derive(Debug, Deserialize)]
pub struct ListingFilter {
    pub state: Option<String>,
    pub category: Option<String>,
    /// Case-insensitive substring over title and content.
    pub q: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// Public projection: shows the pseudonymous id only, with the effective
/// (expiry-aware) status.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub id: Uuid,
    pub anonimax_id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub state: Option<String>,
    pub status: ListingStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ListingResponse {
    pub fn from_listing(listing: Listing, now: OffsetDateTime) -> Self {
        let status = listing.effective_status(now);
        Self {
            id: listing.id,
            anonimax_id: listing.anonimax_id,
            title: listing.title,
            content: listing.content,
            category: listing.category,
            state: listing.state,
            status,
            expires_at: listing.expires_at,
            created_at: listing.created_at,
        }
    }
}

/// Owner's view: adds the payment axis.
#[derive(Debug, Serialize)]
pub struct MyListingResponse {
    #[serde(flatten)]
    pub listing: ListingResponse,
    pub payment_status: PayStatus,
}

impl MyListingResponse {
    pub fn from_listing(listing: Listing, now: OffsetDateTime) -> Self {
        let payment_status = listing.payment_status;
        Self {
            listing: ListingResponse::from_listing(listing, now),
            payment_status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentSummary {
    pub id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub network: String,
    pub status: PayStatus,
    pub tx_hash: Option<String>,
}

impl From<Payment> for PaymentSummary {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            amount: p.amount,
            currency: p.currency,
            network: p.network,
            status: p.status,
            tx_hash: p.tx_hash,
        }
    }
}

/// Where and how much to pay to publish.
#[derive(Debug, Serialize)]
pub struct PaymentInstructions {
    pub amount: f64,
    pub currency: String,
    pub network: String,
    pub address: String,
}

impl From<&ListingFeeConfig> for PaymentInstructions {
    fn from(fee: &ListingFeeConfig) -> Self {
        Self {
            amount: fee.amount,
            currency: fee.currency.clone(),
            network: fee.network.clone(),
            address: fee.address.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateListingResponse {
    pub listing: MyListingResponse,
    pub payment: PaymentSummary,
    pub instructions: PaymentInstructions,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ListingDetailResponse {
    pub listing: ListingResponse,
    /// Contact/crypto projection of the owner's profile; never their email
    /// or account id.
    pub owner: Option<PublicProfile>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_response_never_exposes_user_id() {
        let now = OffsetDateTime::now_utc();
        let listing = Listing {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            anonimax_id: "ANX-AAAA-1111".into(),
            title: "Aulas de violão".into(),
            content: "Aulas para iniciantes, material incluso".into(),
            category: "services".into(),
            state: Some("SP".into()),
            status: ListingStatus::Active,
            payment_status: PayStatus::Verified,
            expires_at: None,
            created_at: now,
            updated_at: now,
        };
        let user_id = listing.user_id;
        let json =
            serde_json::to_string(&ListingResponse::from_listing(listing, now)).unwrap();
        assert!(!json.contains(&user_id.to_string()));
        assert!(json.contains("ANX-AAAA-1111"));
    }
}
