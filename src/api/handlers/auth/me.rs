//! Current-user endpoint, the canonical consumer of [`require_auth`].

use axum::{extract::Extension, http::HeaderMap, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;

use super::{error::AuthError, principal::require_auth, state::AuthState, types::MeResponse};

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, AuthError> {
    // The principal already carries everything the row lookup returned.
    let principal = require_auth(&headers, &pool, &auth_state).await?;

    Ok(Json(MeResponse {
        id: principal.user_id.to_string(),
        email: principal.email,
        created_at: principal.created_at,
    }))
}
