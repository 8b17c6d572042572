use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiResult},
    profiles::{
        dto::{
            FavoriteCreateRequest, FavoriteResponse, MessageResponse, ProfileFilter,
            ProfileUpdateRequest, PublicProfile,
        },
        repo::{Favorite, Profile, ProfileChanges},
    },
    state::AppState,
};

const DESCRIPTION_MAX: usize = 1000;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profiles/me", get(my_profile).put(update_my_profile))
        .route("/profiles", get(list_profiles))
        .route("/profiles/favorites", post(add_favorite))
        .route("/profiles/favorites/list", get(list_favorites))
        .route("/profiles/favorites/:id", delete(remove_favorite))
}

#[instrument(skip(state))]
pub async fn my_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<PublicProfile>> {
    let profile = Profile::find_by_user_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Perfil não encontrado".into()))?;
    Ok(Json(profile.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_my_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ProfileUpdateRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if let Some(description) = &payload.description {
        if description.chars().count() > DESCRIPTION_MAX {
            return Err(ApiError::InvalidInput(
                "Descrição muito longa (máx 1000 caracteres)".into(),
            ));
        }
    }

    if Profile::find_by_user_id(&state.db, user_id).await?.is_none() {
        return Err(ApiError::NotFound("Perfil não encontrado".into()));
    }

    let changes = ProfileChanges {
        session_id: payload.session_id,
        crypto_type: payload.crypto_type,
        crypto_network: payload.crypto_network,
        crypto_address: payload.crypto_address,
        state: payload.state,
        description: payload.description,
    };
    Profile::apply_changes(&state.db, user_id, &changes).await?;

    info!(user_id = %user_id, "profile updated");
    Ok(Json(MessageResponse {
        message: "Perfil atualizado com sucesso".into(),
    }))
}

fn matches_search(profile: &Profile, search: &str) -> bool {
    let search = search.to_lowercase();
    profile.anonimax_id.to_lowercase().contains(&search)
        || profile
            .description
            .as_deref()
            .map(|d| d.to_lowercase().contains(&search))
            .unwrap_or(false)
}

#[instrument(skip(state))]
pub async fn list_profiles(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(filter): Query<ProfileFilter>,
) -> ApiResult<Json<Vec<PublicProfile>>> {
    let rows = Profile::list_contactable(&state.db, filter.state.as_deref()).await?;

    let items = rows
        .into_iter()
        .filter(|p| match &filter.search {
            Some(s) if !s.trim().is_empty() => matches_search(p, s.trim()),
            _ => true,
        })
        .map(Into::into)
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<FavoriteCreateRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if Favorite::exists(&state.db, user_id, &payload.target_anonimax_id).await? {
        return Err(ApiError::Conflict("Perfil já está nos favoritos".into()));
    }

    Favorite::create(
        &state.db,
        user_id,
        &payload.target_anonimax_id,
        payload.custom_name.as_deref(),
        payload.custom_description.as_deref(),
    )
    .await?;

    info!(user_id = %user_id, target = %payload.target_anonimax_id, "favorite added");
    Ok(Json(MessageResponse {
        message: "Adicionado aos favoritos".into(),
    }))
}

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<FavoriteResponse>>> {
    let favorites = Favorite::list_by_user(&state.db, user_id).await?;

    let mut items = Vec::with_capacity(favorites.len());
    for favorite in favorites {
        let target =
            Profile::find_by_anonimax_id(&state.db, &favorite.target_anonimax_id).await?;
        items.push(FavoriteResponse::from_favorite(favorite, target.as_ref()));
    }
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let removed = Favorite::delete_owned(&state.db, id, user_id).await?;
    if !removed {
        return Err(ApiError::NotFound("Favorito não encontrado".into()));
    }

    info!(user_id = %user_id, favorite_id = %id, "favorite removed");
    Ok(Json(MessageResponse {
        message: "Removido dos favoritos".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_profile(anonimax_id: &str, description: Option<&str>) -> Profile {
        let now = OffsetDateTime::now_utc();
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            anonimax_id: anonimax_id.into(),
            session_id: Some("handle".into()),
            crypto_type: None,
            crypto_network: None,
            crypto_address: None,
            state: None,
            description: description.map(Into::into),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn search_matches_anonimax_id() {
        let profile = sample_profile("ANX-AB12-CD34", None);
        assert!(matches_search(&profile, "ab12"));
        assert!(!matches_search(&profile, "zz99"));
    }

    #[test]
    fn search_matches_description() {
        let profile = sample_profile("ANX-AB12-CD34", Some("Colecionador de vinil"));
        assert!(matches_search(&profile, "VINIL"));
        assert!(!matches_search(&profile, "selos"));
    }

    #[test]
    fn search_handles_missing_description() {
        let profile = sample_profile("ANX-AB12-CD34", None);
        assert!(!matches_search(&profile, "vinil"));
    }
}
