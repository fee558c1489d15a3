//! Authenticated principal resolution from the bearer token.
//!
//! Every protected endpoint passes through here: extract the bearer token,
//! validate signature and expiry, then re-resolve the subject against the
//! users table. A token whose subject no longer exists (deleted user) is as
//! unauthenticated as no token at all.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use super::{
    error::AuthError,
    state::AuthState,
    storage::{self, UserRecord},
    token,
};

/// Authenticated user context derived from a session token.
///
/// Carries everything the row lookup already paid for, so handlers never
/// re-read the users table for the same request.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&UserRecord> for Principal {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Resolve the request's bearer token into a principal, rejecting
/// missing/invalid tokens and unresolvable subjects uniformly.
///
/// # Errors
/// `Unauthenticated` for any credential failure; `Internal` for DB errors.
pub async fn require_auth(
    headers: &HeaderMap,
    pool: &PgPool,
    state: &AuthState,
) -> Result<Principal, AuthError> {
    resolve(headers, pool, state)
        .await?
        .ok_or(AuthError::Unauthenticated)
}

/// Like [`require_auth`], but absence of a valid credential yields `None`
/// instead of a rejection. Used by endpoints that degrade gracefully for
/// anonymous callers.
///
/// # Errors
/// `Internal` for DB errors; never `Unauthenticated`.
pub async fn optional_auth(
    headers: &HeaderMap,
    pool: &PgPool,
    state: &AuthState,
) -> Result<Option<Principal>, AuthError> {
    resolve(headers, pool, state).await
}

async fn resolve(
    headers: &HeaderMap,
    pool: &PgPool,
    state: &AuthState,
) -> Result<Option<Principal>, AuthError> {
    let Some(token) = extract_bearer_token(headers) else {
        return Ok(None);
    };

    let claims = match token::decode(state.config().session_secret(), &token) {
        Ok(claims) => claims,
        Err(err) => {
            // The reason stays in the logs; callers only see "absent".
            debug!("session token rejected: {err}");
            return Ok(None);
        }
    };

    let user = storage::lookup_user_by_id(pool, claims.sub)
        .await
        .map_err(AuthError::Internal)?;

    Ok(user.map(|user| Principal::from(&user)))
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
