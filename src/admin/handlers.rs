use axum::{
    extract::{FromRef, Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    admin::{
        dto::{
            AdminLoginRequest, ListingActionRequest, ListingStatusFilter, MessageResponse,
            PaymentStatusFilter, PaymentVerifyRequest, StatsResponse,
        },
        repo,
    },
    auth::{
        dto::{AuthResponse, PublicUser},
        jwt::{AdminUser, JwtKeys},
        password::verify_password,
        repo::User,
    },
    error::{ApiError, ApiResult},
    listings::{
        dto::MyListingResponse,
        repo::{Listing, ListingStatus, PayStatus, Payment},
        services::{self, ListingAction, PaymentAction},
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(login))
        .route("/admin/stats", get(stats))
        .route("/admin/users", get(list_users))
        .route("/admin/listings", get(list_listings))
        .route("/admin/payments", get(list_payments))
        .route("/admin/payments/verify", post(verify_payment))
        .route("/admin/listings/action", post(listing_action))
        .route("/admin/users/:id", delete(delete_user))
}

/// Admin credentials are ordinary accounts with the admin flag; there is no
/// shared secret.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<AdminLoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "admin login unknown email");
            return Err(ApiError::Unauthorized("Credenciais inválidas".into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? || !user.is_admin {
        warn!(user_id = %user.id, "admin login denied");
        return Err(ApiError::Unauthorized("Credenciais inválidas".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    info!(user_id = %user.id, "admin logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
        message: "Login admin realizado".into(),
    }))
}

#[instrument(skip(state, _admin))]
pub async fn stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<StatsResponse>> {
    let stats = repo::platform_stats(&state.db).await?;
    Ok(Json(stats.into()))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = repo::list_recent_users(&state.db).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, _admin))]
pub async fn list_listings(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(filter): Query<ListingStatusFilter>,
) -> ApiResult<Json<Vec<MyListingResponse>>> {
    let rows = Listing::list_for_admin(&state.db, filter.status).await?;
    let now = OffsetDateTime::now_utc();
    Ok(Json(
        rows.into_iter()
            .map(|l| MyListingResponse::from_listing(l, now))
            .collect(),
    ))
}

/// Full rows: the admin needs listing_id/tx_hash/verified_at to check the
/// chain before deciding.
#[instrument(skip(state, _admin))]
pub async fn list_payments(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(filter): Query<PaymentStatusFilter>,
) -> ApiResult<Json<Vec<Payment>>> {
    let rows = Payment::list_for_admin(&state.db, filter.status).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, _admin, payload))]
pub async fn verify_payment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<PaymentVerifyRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let action = PaymentAction::parse(&payload.action)
        .ok_or_else(|| ApiError::InvalidInput("Ação inválida".into()))?;

    let payment = Payment::find_by_id(&state.db, payload.payment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Pagamento não encontrado".into()))?;

    let message = match action {
        PaymentAction::Verify => {
            let now = OffsetDateTime::now_utc();
            payment
                .mark_verified(&state.db, now, services::activation_expiry(now))
                .await?;
            info!(payment_id = %payment.id, listing_id = ?payment.listing_id, "payment verified");
            "Pagamento verificado e anúncio ativado"
        }
        PaymentAction::Reject => {
            payment.mark_rejected(&state.db).await?;
            info!(payment_id = %payment.id, "payment rejected");
            "Pagamento rejeitado"
        }
    };

    Ok(Json(MessageResponse {
        message: message.into(),
    }))
}

#[instrument(skip(state, _admin, payload))]
pub async fn listing_action(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<ListingActionRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let action = ListingAction::parse(&payload.action)
        .ok_or_else(|| ApiError::InvalidInput("Ação inválida".into()))?;

    let listing = Listing::find_by_id(&state.db, payload.listing_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Anúncio não encontrado".into()))?;

    let message = match action {
        ListingAction::Approve => {
            if state.config.approval_requires_verified_payment
                && listing.payment_status != PayStatus::Verified
            {
                return Err(ApiError::InvalidInput(
                    "Pagamento ainda não verificado".into(),
                ));
            }
            let now = OffsetDateTime::now_utc();
            Listing::set_status(
                &state.db,
                listing.id,
                ListingStatus::Active,
                Some(services::activation_expiry(now)),
            )
            .await?;
            info!(listing_id = %listing.id, "listing approved");
            "Anúncio aprovado"
        }
        ListingAction::Reject => {
            Listing::set_status(&state.db, listing.id, ListingStatus::Rejected, None).await?;
            info!(listing_id = %listing.id, "listing rejected");
            "Anúncio rejeitado"
        }
    };

    Ok(Json(MessageResponse {
        message: message.into(),
    }))
}

#[instrument(skip(state, _admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = repo::delete_user_cascade(&state.db, user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Usuário não encontrado".into()));
    }

    info!(user_id = %user_id, "user deleted");
    Ok(Json(MessageResponse {
        message: "Usuário excluído com sucesso".into(),
    }))
}
