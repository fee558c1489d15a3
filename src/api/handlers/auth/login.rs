//! Dual-mode login: password or seed phrase.
//!
//! Each path rejects with one uniform message whether the account is
//! unknown or the credential is wrong.

use anyhow::anyhow;
use axum::{extract::Extension, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;

use super::{
    credentials::{seed_key, verify_password, verify_seed, MIN_SEED_WORDS},
    error::AuthError,
    seed::normalize_seed,
    state::AuthState,
    storage::{lookup_user_by_email, lookup_user_by_seed_key, UserRecord},
    token,
    types::{LoginEmailRequest, LoginSeedRequest, TokenResponse},
    utils::normalize_email,
};

#[utoipa::path(
    post,
    path = "/auth/login/email",
    request_body = LoginEmailRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login_email(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Json(request): Json<LoginEmailRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let email = normalize_email(&request.email);

    let Some(user) = lookup_user_by_email(&pool, &email).await? else {
        return Err(AuthError::Unauthenticated);
    };

    let password = request.password;
    let password_hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|err| AuthError::Internal(anyhow!("verification task failed: {err}")))?;
    if !verified {
        return Err(AuthError::Unauthenticated);
    }

    issue_session(&auth_state, &user)
}

#[utoipa::path(
    post,
    path = "/auth/login/seed",
    request_body = LoginSeedRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Seed phrase is too short"),
        (status = 401, description = "Invalid seed phrase")
    ),
    tag = "auth"
)]
pub async fn login_seed(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Json(request): Json<LoginSeedRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let phrase = normalize_seed(&request.seed_phrase);
    // Cheap check first, before any store access or slow hashing.
    if phrase.split(' ').filter(|word| !word.is_empty()).count() < MIN_SEED_WORDS {
        return Err(AuthError::validation(
            "seed_phrase",
            "Seed phrase is too short",
        ));
    }

    // Deterministic key finds the candidate row; the salted slow hash
    // confirms it.
    let lookup_key = seed_key(auth_state.config().seed_secret(), &phrase)?;
    let Some(user) = lookup_user_by_seed_key(&pool, &lookup_key).await? else {
        return Err(AuthError::InvalidSeedPhrase);
    };

    let seed_hash = user.seed_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_seed(&phrase, &seed_hash))
        .await
        .map_err(|err| AuthError::Internal(anyhow!("verification task failed: {err}")))?;
    if !verified {
        return Err(AuthError::InvalidSeedPhrase);
    }

    issue_session(&auth_state, &user)
}

fn issue_session(
    auth_state: &AuthState,
    user: &UserRecord,
) -> Result<impl IntoResponse, AuthError> {
    let access_token = token::issue(
        auth_state.config().session_secret(),
        user.id,
        &user.email,
        auth_state.config().session_ttl_seconds(),
    )?;
    Ok(Json(TokenResponse { access_token }))
}
