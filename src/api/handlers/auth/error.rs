//! Error taxonomy for the auth core.
//!
//! Authentication failures collapse into a single uniform message no matter
//! which check failed, so response text cannot be used to probe for
//! registered emails or seed phrases. Conflicts are reported distinctly:
//! a duplicate email carries no secret information.
//!
//! Nothing here retries; every failure is terminal for the request.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// A required setting is absent. Local-auth secrets are checked at
    /// startup; this surfaces for optional integrations like the OAuth link.
    #[error("{0} is not configured")]
    Configuration(&'static str),

    /// User-correctable input problem, reported with field-level detail.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Wrong password, unknown email, missing/invalid/expired token.
    /// One message for all of them.
    #[error("invalid credentials")]
    Unauthenticated,

    /// Unknown seed key or failed confirmation hash; same body for both, so
    /// the response cannot tell a registered phrase from an unknown one.
    #[error("invalid seed phrase")]
    InvalidSeedPhrase,

    /// Duplicate email at registration.
    #[error("email already registered")]
    Conflict,

    /// Malformed, tampered, or expired OAuth state; rejected uniformly.
    #[error("invalid state")]
    InvalidState,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

// Token issue/decode problems reaching a handler are server-side faults;
// credential rejection is decided earlier by the callers that inspect the
// decode result.
impl From<super::token::TokenError> for AuthError {
    fn from(err: super::token::TokenError) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

impl From<super::oauth_state::StateError> for AuthError {
    fn from(_: super::oauth_state::StateError) -> Self {
        Self::InvalidState
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::Configuration(setting) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": format!("{setting} is not configured") })),
            )
                .into_response(),
            Self::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": message, "field": field })),
            )
                .into_response(),
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": "Invalid credentials" })),
            )
                .into_response(),
            Self::InvalidSeedPhrase => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": "Invalid seed phrase" })),
            )
                .into_response(),
            Self::Conflict => (
                StatusCode::CONFLICT,
                Json(json!({ "detail": "Email already registered" })),
            )
                .into_response(),
            Self::InvalidState => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "Invalid state" })),
            )
                .into_response(),
            Self::Internal(err) => {
                // Detail stays in the logs; the body is generic.
                error!("internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AuthError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            status_of(AuthError::Configuration("VELLUM_GOOGLE_CLIENT_ID")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AuthError::validation("email", "Invalid email")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AuthError::Unauthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AuthError::InvalidSeedPhrase),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(AuthError::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_of(AuthError::InvalidState), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AuthError::Internal(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unauthenticated_message_is_uniform() {
        assert_eq!(AuthError::Unauthenticated.to_string(), "invalid credentials");
    }
}
