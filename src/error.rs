use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Domain error taxonomy. Every handler failure maps to one of these;
/// user-facing messages carry through untranslated.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    /// Content blocked by the personal-information filter. Carries every
    /// matched issue label so the client can show them all.
    #[error("{detail}")]
    Moderation {
        detail: String,
        issues: Vec<&'static str>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Erro interno do servidor")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "detail": msg }))
            }
            ApiError::Moderation { detail, issues } => (
                StatusCode::BAD_REQUEST,
                json!({ "detail": detail, "issues": issues }),
            ),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, json!({ "detail": msg }))
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "detail": msg })),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "detail": msg })),
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": "Erro interno do servidor" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                ApiError::InvalidInput("ruim".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Moderation {
                    detail: "bloqueado".into(),
                    issues: vec!["Email detectado"],
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Unauthorized("nope".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::NotFound("cadê".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                ApiError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn internal_error_hides_cause() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused at 10.0.0.7"));
        assert_eq!(err.to_string(), "Erro interno do servidor");
    }
}
