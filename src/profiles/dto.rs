use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profiles::repo::{Favorite, Profile};

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub session_id: Option<String>,
    pub crypto_type: Option<String>,
    pub crypto_network: Option<String>,
    pub crypto_address: Option<String>,
    pub state: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileFilter {
    pub state: Option<String>,
    /// Case-insensitive substring over anonimax_id and description.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteCreateRequest {
    pub target_anonimax_id: String,
    pub custom_name: Option<String>,
    pub custom_description: Option<String>,
}

/// Contact/crypto projection shared with listing details. Never carries the
/// owning user's id or email.
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub anonimax_id: String,
    pub session_id: Option<String>,
    pub crypto_type: Option<String>,
    pub crypto_network: Option<String>,
    pub crypto_address: Option<String>,
    pub state: Option<String>,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Profile> for PublicProfile {
    fn from(p: Profile) -> Self {
        Self {
            anonimax_id: p.anonimax_id,
            session_id: p.session_id,
            crypto_type: p.crypto_type,
            crypto_network: p.crypto_network,
            crypto_address: p.crypto_address,
            state: p.state,
            description: p.description,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub id: Uuid,
    pub target_anonimax_id: String,
    pub custom_name: Option<String>,
    pub custom_description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Present when the target currently exists as a profile.
    pub profile: Option<FavoriteTargetProfile>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteTargetProfile {
    pub session_id: Option<String>,
    pub state: Option<String>,
}

impl FavoriteResponse {
    pub fn from_favorite(favorite: Favorite, target: Option<&Profile>) -> Self {
        Self {
            id: favorite.id,
            target_anonimax_id: favorite.target_anonimax_id,
            custom_name: favorite.custom_name,
            custom_description: favorite.custom_description,
            created_at: favorite.created_at,
            profile: target.map(|p| FavoriteTargetProfile {
                session_id: p.session_id.clone(),
                state: p.state.clone(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_profile_omits_user_id() {
        let now = OffsetDateTime::now_utc();
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            anonimax_id: "ANX-ZZZZ-9999".into(),
            session_id: Some("sess-handle".into()),
            crypto_type: Some("BRZ".into()),
            crypto_network: Some("Polygon".into()),
            crypto_address: None,
            state: Some("RJ".into()),
            description: None,
            created_at: now,
            updated_at: now,
        };
        let user_id = profile.user_id;
        let json = serde_json::to_string(&PublicProfile::from(profile)).unwrap();
        assert!(!json.contains(&user_id.to_string()));
        assert!(json.contains("sess-handle"));
    }
}
