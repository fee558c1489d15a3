//! Registration: create the user row and hand back a session token plus the
//! seed phrase, exactly once.

use anyhow::anyhow;
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::{
    credentials::{hash_password, hash_seed, seed_key},
    error::AuthError,
    seed::{generate_seed_phrase, DEFAULT_SEED_WORDS},
    state::AuthState,
    storage::{insert_user, SignupOutcome},
    token,
    types::{RegisterRequest, RegisterResponse},
    utils::{normalize_email, valid_email},
};

const MIN_PASSWORD_CHARS: usize = 6;

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(AuthError::validation("email", "Invalid email"));
    }
    if request.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::validation(
            "password",
            format!("Password must be at least {MIN_PASSWORD_CHARS} characters"),
        ));
    }

    // The phrase goes into the response and nowhere else. Only the derived
    // lookup key and hashes are stored; it must never be logged.
    let seed_phrase = generate_seed_phrase(DEFAULT_SEED_WORDS);
    let lookup_key = seed_key(auth_state.config().seed_secret(), &seed_phrase)?;

    // Two adaptive hashes back to back; keep them off the async path.
    let password = request.password;
    let phrase = seed_phrase.clone();
    let (password_hash, seed_hash) =
        tokio::task::spawn_blocking(move || -> anyhow::Result<(String, String)> {
            Ok((hash_password(&password)?, hash_seed(&phrase)?))
        })
        .await
        .map_err(|err| AuthError::Internal(anyhow!("hashing task failed: {err}")))??;

    let user = match insert_user(&pool, &email, &password_hash, &lookup_key, &seed_hash).await? {
        SignupOutcome::Created(user) => user,
        SignupOutcome::Conflict => return Err(AuthError::Conflict),
    };

    let access_token = token::issue(
        auth_state.config().session_secret(),
        user.id,
        &user.email,
        auth_state.config().session_ttl_seconds(),
    )?;

    info!(user_id = %user.id, "registered new user");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            access_token,
            seed_phrase,
        }),
    ))
}
