use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, PublicUser,
            RefreshRequest, RegisterRequest, ResetPasswordRequest, VerifyEmailRequest,
        },
        ids::{generate_anonimax_id, generate_token},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::User,
    },
    email,
    error::{ApiError, ApiResult},
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;
const ID_GENERATION_ATTEMPTS: usize = 16;
const RESET_TOKEN_TTL_HOURS: i64 = 1;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/verify-email", post(verify_email))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn token_pair(keys: &JwtKeys, user_id: uuid::Uuid) -> ApiResult<(String, String)> {
    let access = keys.sign_access(user_id)?;
    let refresh = keys.sign_refresh(user_id)?;
    Ok((access, refresh))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::InvalidInput("Email inválido".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::InvalidInput(
            "A senha deve ter pelo menos 6 caracteres".into(),
        ));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Este email já está cadastrado".into()));
    }

    // Random id + uniqueness check. The id space is 36^8, so the cap only
    // matters if something is badly wrong with the store.
    let mut anonimax_id = None;
    for _ in 0..ID_GENERATION_ATTEMPTS {
        let candidate = generate_anonimax_id();
        if !User::anonimax_id_taken(&state.db, &candidate).await? {
            anonimax_id = Some(candidate);
            break;
        }
    }
    let anonimax_id = anonimax_id.ok_or_else(|| {
        error!("could not generate a free anonimax id");
        ApiError::Internal(anyhow::anyhow!("anonimax id generation exhausted"))
    })?;

    let password_hash = hash_password(&payload.password)?;
    let verification_token = generate_token();

    let user = User::create_with_profile(
        &state.db,
        &payload.email,
        &password_hash,
        &anonimax_id,
        &verification_token,
    )
    .await?;

    let verification_link = format!(
        "{}/verify?token={}",
        state.config.public_base_url, verification_token
    );
    let (subject, html) = email::verification_email(&verification_link);
    if let Err(e) = state.mailer.send(&user.email, &subject, &html).await {
        error!(error = %e, email = %user.email, "verification email failed");
    }

    let keys = JwtKeys::from_ref(&state);
    let (access_token, refresh_token) = token_pair(&keys, user.id)?;

    info!(user_id = %user.id, anonimax_id = %user.anonimax_id, "user registered");
    let message = format!(
        "Conta criada! Verifique seu email para ativar. Seu Anonimax ID é: {anonimax_id}"
    );
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
        message,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email and wrong password produce the same error so the
    // endpoint cannot be used to probe which emails exist.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Unauthorized("Email ou senha incorretos".into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Email ou senha incorretos".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let (access_token, refresh_token) = token_pair(&keys, user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
        message: "Login realizado com sucesso!".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|_| ApiError::Unauthorized("Não autorizado".into()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Não autorizado".into()))?;

    let (access_token, refresh_token) = token_pair(&keys, user.id)?;
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
        message: "Sessão renovada".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let user = User::find_by_verification_token(&state.db, &payload.token)
        .await?
        .ok_or_else(|| ApiError::InvalidInput("Token de verificação inválido".into()))?;

    if user.is_verified {
        return Ok(Json(MessageResponse {
            message: "Email já verificado".into(),
        }));
    }

    User::mark_verified(&state.db, user.id).await?;
    info!(user_id = %user.id, "email verified");
    Ok(Json(MessageResponse {
        message: "Email verificado com sucesso!".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    // The response is identical whether or not the account exists.
    let generic = MessageResponse {
        message: "Se o email existir, você receberá instruções para redefinir sua senha".into(),
    };

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        return Ok(Json(generic));
    };

    let reset_token = generate_token();
    let expires = OffsetDateTime::now_utc() + Duration::hours(RESET_TOKEN_TTL_HOURS);
    User::set_reset_token(&state.db, user.id, &reset_token, expires).await?;

    let reset_link = format!(
        "{}/reset-password?token={}",
        state.config.public_base_url, reset_token
    );
    let (subject, html) = email::reset_password_email(&reset_link);
    if let Err(e) = state.mailer.send(&user.email, &subject, &html).await {
        error!(error = %e, email = %user.email, "reset email failed");
    }

    info!(user_id = %user.id, "reset token issued");
    Ok(Json(generic))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let user = User::find_by_reset_token(&state.db, &payload.token)
        .await?
        .ok_or_else(|| ApiError::InvalidInput("Token inválido ou expirado".into()))?;

    match user.reset_token_expires {
        Some(expires) if expires < OffsetDateTime::now_utc() => {
            warn!(user_id = %user.id, "expired reset token");
            return Err(ApiError::InvalidInput("Token expirado".into()));
        }
        _ => {}
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::InvalidInput(
            "A senha deve ter pelo menos 6 caracteres".into(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    User::apply_password_reset(&state.db, user.id, &password_hash).await?;

    info!(user_id = %user.id, "password reset");
    Ok(Json(MessageResponse {
        message: "Senha redefinida com sucesso!".into(),
    }))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Não autorizado".into()))?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_plain_addresses() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("u.ser+tag@sub.example.org"));
    }

    #[test]
    fn email_validation_rejects_garbage() {
        for bad in ["", "semarroba", "a@b", "a b@c.com", "@x.com"] {
            assert!(!is_valid_email(bad), "accepted: {bad}");
        }
    }
}
