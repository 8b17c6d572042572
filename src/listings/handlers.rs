use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{jwt::AuthUser, repo::User},
    error::{ApiError, ApiResult},
    listings::{
        dto::{
            CreateListingRequest, CreateListingResponse, ListingDetailResponse, ListingFilter,
            ListingResponse, MessageResponse, MyListingResponse, SubmitPaymentRequest,
        },
        repo::{Listing, ListingStatus, NewListing, Payment},
        services,
    },
    profiles::repo::Profile,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/listings/create", post(create_listing))
        .route("/listings/submit-payment", post(submit_payment))
        .route("/listings", get(list_listings))
        .route("/listings/my-listings", get(my_listings))
        .route("/listings/:id", get(listing_detail))
}

fn matches_query(listing: &Listing, q: &str) -> bool {
    let q = q.to_lowercase();
    listing.title.to_lowercase().contains(&q) || listing.content.to_lowercase().contains(&q)
}

#[instrument(skip(state, payload))]
pub async fn create_listing(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateListingRequest>,
) -> ApiResult<(StatusCode, Json<CreateListingResponse>)> {
    services::validate_submission(&payload.title, &payload.content)?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Não autorizado".into()))?;

    let fee = &state.config.listing_fee;
    let (listing, payment) = Listing::create_with_payment(
        &state.db,
        user.id,
        &user.anonimax_id,
        NewListing {
            title: payload.title.trim(),
            content: payload.content.trim(),
            category: &payload.category,
            state: payload.state.as_deref(),
        },
        fee,
    )
    .await?;

    info!(listing_id = %listing.id, payment_id = %payment.id, "listing created");
    let now = OffsetDateTime::now_utc();
    Ok((
        StatusCode::CREATED,
        Json(CreateListingResponse {
            listing: MyListingResponse::from_listing(listing, now),
            payment: payment.into(),
            instructions: fee.into(),
            message: "Anúncio criado! Envie o pagamento para ativar.".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn submit_payment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SubmitPaymentRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let payment =
        Payment::find_pending_for_listing(&state.db, payload.listing_id, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Pagamento não encontrado".into()))?;

    Payment::attach_tx_hash(&state.db, payment.id, payload.tx_hash.trim()).await?;

    info!(payment_id = %payment.id, "payment proof submitted");
    Ok(Json(MessageResponse {
        message: "Comprovante enviado! Aguardando verificação.".into(),
    }))
}

#[instrument(skip(state))]
pub async fn list_listings(
    State(state): State<AppState>,
    Query(filter): Query<ListingFilter>,
) -> ApiResult<Json<Vec<ListingResponse>>> {
    let rows = Listing::list_active(
        &state.db,
        filter.state.as_deref(),
        filter.category.as_deref(),
        filter.limit,
        filter.offset,
    )
    .await?;

    let now = OffsetDateTime::now_utc();
    let items = rows
        .into_iter()
        .filter(|l| match &filter.q {
            Some(q) if !q.trim().is_empty() => matches_query(l, q.trim()),
            _ => true,
        })
        .map(|l| ListingResponse::from_listing(l, now))
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn my_listings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<MyListingResponse>>> {
    let rows = Listing::list_by_user(&state.db, user_id).await?;
    let now = OffsetDateTime::now_utc();
    let items = rows
        .into_iter()
        .map(|l| MyListingResponse::from_listing(l, now))
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn listing_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ListingDetailResponse>> {
    let listing = Listing::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Anúncio não encontrado".into()))?;

    let now = OffsetDateTime::now_utc();
    if listing.effective_status(now) != ListingStatus::Active {
        return Err(ApiError::NotFound("Anúncio não encontrado".into()));
    }

    let owner = Profile::find_by_user_id(&state.db, listing.user_id)
        .await?
        .map(Into::into);

    Ok(Json(ListingDetailResponse {
        listing: ListingResponse::from_listing(listing, now),
        owner,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::repo::PayStatus;

    fn sample_listing(title: &str, content: &str) -> Listing {
        let now = OffsetDateTime::now_utc();
        Listing {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            anonimax_id: "ANX-AAAA-0000".into(),
            title: title.into(),
            content: content.into(),
            category: "services".into(),
            state: None,
            status: ListingStatus::Active,
            payment_status: PayStatus::Verified,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn query_matches_title_case_insensitively() {
        let listing = sample_listing("Aulas de Violão", "material incluso para iniciantes");
        assert!(matches_query(&listing, "violão"));
        assert!(matches_query(&listing, "AULAS"));
    }

    #[test]
    fn query_matches_content_substring() {
        let listing = sample_listing("Aulas de Violão", "Material incluso para iniciantes");
        assert!(matches_query(&listing, "incluso"));
        assert!(!matches_query(&listing, "piano"));
    }
}
