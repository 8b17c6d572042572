use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::admin::repo::PlatformStats;
use crate::listings::repo::{ListingStatus, PayStatus};

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentVerifyRequest {
    pub payment_id: Uuid,
    /// "verify" or "reject".
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct ListingActionRequest {
    pub listing_id: Uuid,
    /// "approve" or "reject".
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct ListingStatusFilter {
    pub status: Option<ListingStatus>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusFilter {
    pub status: Option<PayStatus>,
}

#[derive(Debug, Serialize)]
pub struct UserCounts {
    pub total: i64,
    pub verified: i64,
}

#[derive(Debug, Serialize)]
pub struct ListingCounts {
    pub total: i64,
    pub active: i64,
    pub pending: i64,
}

#[derive(Debug, Serialize)]
pub struct PaymentCounts {
    pub pending: i64,
    pub verified: i64,
    pub total_revenue: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub users: UserCounts,
    pub listings: ListingCounts,
    pub payments: PaymentCounts,
}

impl From<PlatformStats> for StatsResponse {
    fn from(s: PlatformStats) -> Self {
        Self {
            users: UserCounts {
                total: s.total_users,
                verified: s.verified_users,
            },
            listings: ListingCounts {
                total: s.total_listings,
                active: s.active_listings,
                pending: s.pending_listings,
            },
            payments: PaymentCounts {
                pending: s.pending_payments,
                verified: s.verified_payments,
                total_revenue: s.total_revenue,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
