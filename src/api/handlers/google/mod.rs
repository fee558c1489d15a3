//! Google Drive link flow.
//!
//! Only the state round trip is identity-core logic: `/google/login` embeds
//! a signed, time-bounded state value before redirecting out, and
//! `/google/callback` refuses to proceed unless that state validates. The
//! code exchange and the stored connection are collaborator plumbing.
//!
//! The decoded `return_to` is validated against the configured origin
//! allow-list as a second, independent check: a correctly signed state does
//! not make a redirect target safe.

mod storage;
pub(crate) mod types;

use anyhow::{anyhow, Context};
use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    response::{IntoResponse, Redirect},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error};
use url::Url;

use super::auth::{
    error::AuthError,
    oauth_state::{decode_state, encode_state},
    principal::optional_auth,
    AuthState,
};
use self::storage::GoogleConnection;
use self::types::GoogleStatusResponse;

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const DRIVE_SCOPES: &[&str] = &[
    "openid",
    "email",
    "profile",
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/drive.file",
];

/// Google OAuth client settings. All-or-nothing: the CLI refuses partial
/// configuration, so an instance either has the link flow or cleanly 400s.
#[derive(Clone, Debug)]
pub struct GoogleConfig {
    client_id: String,
    client_secret: SecretString,
    redirect_url: String,
}

impl GoogleConfig {
    #[must_use]
    pub fn new(client_id: String, client_secret: SecretString, redirect_url: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_url,
        }
    }
}

fn require_google(auth_state: &AuthState) -> Result<&GoogleConfig, AuthError> {
    auth_state
        .google()
        .ok_or(AuthError::Configuration("Google OAuth"))
}

/// Check a decoded `return_to` against the origin allow-list.
fn validate_return_to(auth_state: &AuthState, return_to: &str) -> Result<String, AuthError> {
    let parsed = Url::parse(return_to)
        .map_err(|_| AuthError::validation("return_to", "Invalid return_to"))?;
    let Some(host) = parsed.host_str() else {
        return Err(AuthError::validation("return_to", "Invalid return_to"));
    };
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{host}{port}", parsed.scheme());

    if auth_state.config().allowed_origins().contains(&origin) {
        Ok(return_to.to_string())
    } else {
        debug!("rejected return_to origin: {origin}");
        Err(AuthError::validation("return_to", "Invalid return_to"))
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    #[serde(default)]
    return_to: Option<String>,
}

#[utoipa::path(
    get,
    path = "/google/login",
    params(("return_to" = Option<String>, Query, description = "Frontend URL to return to after linking")),
    responses(
        (status = 303, description = "Redirect to the Google consent screen"),
        (status = 400, description = "OAuth not configured or return_to not allowed")
    ),
    tag = "google"
)]
pub async fn login(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Query(params): Query<LoginParams>,
) -> Result<impl IntoResponse, AuthError> {
    let google = require_google(&auth_state)?;

    // Linking works for anonymous callers too; a session only adds context
    // to the trace.
    if let Some(principal) = optional_auth(&headers, &pool, &auth_state).await? {
        debug!(user_id = %principal.user_id, "google link initiated");
    }

    let return_to = params.return_to.filter(|value| !value.is_empty()).map_or_else(
        || {
            auth_state
                .config()
                .frontend_base_url()
                .trim_end_matches('/')
                .to_string()
        },
        |value| value,
    );
    let return_to = validate_return_to(&auth_state, &return_to)?;

    let state = encode_state(auth_state.config().state_secret(), &return_to)?;

    let mut url = Url::parse(AUTHORIZATION_ENDPOINT)
        .context("invalid authorization endpoint")
        .map_err(AuthError::Internal)?;
    url.query_pairs_mut()
        .append_pair("client_id", &google.client_id)
        .append_pair("redirect_uri", &google.redirect_url)
        .append_pair("response_type", "code")
        .append_pair("scope", &DRIVE_SCOPES.join(" "))
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("include_granted_scopes", "true")
        .append_pair("state", &state);

    Ok(Redirect::to(url.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: String,
    state: String,
}

#[utoipa::path(
    get,
    path = "/google/callback",
    params(
        ("code" = String, Query, description = "Authorization code from Google"),
        ("state" = String, Query, description = "Signed state issued by /google/login")
    ),
    responses(
        (status = 303, description = "Redirect back to the validated return_to"),
        (status = 400, description = "Invalid state or code exchange failure")
    ),
    tag = "google"
)]
pub async fn callback(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, AuthError> {
    let google = require_google(&auth_state)?;

    // Validate the state before touching the code: anything malformed,
    // tampered, or older than the replay window stops here.
    let return_to = decode_state(auth_state.config().state_secret(), &params.state)?;
    let return_to = validate_return_to(&auth_state, &return_to)?;

    let token = exchange_code(google, &params.code).await?;
    let Some(access_token) = token
        .get("access_token")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
    else {
        return Err(AuthError::validation("code", "No access token"));
    };

    let userinfo = fetch_userinfo(&access_token).await?;

    let expires_in = token
        .get("expires_in")
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(3600);
    let expires_at = chrono::Utc::now() + chrono::Duration::seconds(expires_in);

    // Google only returns a refresh token on the first consent; keep the
    // stored one when the response omits it.
    let existing = storage::get_connection(&pool).await?;
    let refresh_token = token
        .get("refresh_token")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .or_else(|| existing.and_then(|conn| conn.refresh_token));

    let connection = GoogleConnection {
        email: userinfo
            .get("email")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string),
        sub: userinfo
            .get("sub")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string),
        access_token,
        refresh_token,
        token_type: token
            .get("token_type")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string),
        scope: token
            .get("scope")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string),
        expires_at: Some(expires_at),
    };
    storage::upsert_connection(&pool, &connection).await?;

    Ok(Redirect::to(&return_to))
}

#[utoipa::path(
    get,
    path = "/google/status",
    responses(
        (status = 200, description = "Link status", body = GoogleStatusResponse)
    ),
    tag = "google"
)]
pub async fn status(pool: Extension<PgPool>) -> Result<impl IntoResponse, AuthError> {
    let connection = storage::get_connection(&pool).await?;
    Ok(Json(GoogleStatusResponse {
        connected: connection.is_some(),
        email: connection.and_then(|conn| conn.email),
    }))
}

#[utoipa::path(
    post,
    path = "/google/logout",
    responses(
        (status = 200, description = "Connection removed")
    ),
    tag = "google"
)]
pub async fn logout(pool: Extension<PgPool>) -> Result<impl IntoResponse, AuthError> {
    storage::delete_connection(&pool).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

async fn exchange_code(
    google: &GoogleConfig,
    code: &str,
) -> Result<serde_json::Value, AuthError> {
    let client = reqwest::Client::builder()
        .user_agent(crate::APP_USER_AGENT)
        .build()
        .map_err(|err| AuthError::Internal(anyhow!("failed to build http client: {err}")))?;

    let response = client
        .post(TOKEN_ENDPOINT)
        .form(&[
            ("code", code),
            ("client_id", &google.client_id),
            ("client_secret", google.client_secret.expose_secret()),
            ("redirect_uri", &google.redirect_url),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|err| AuthError::Internal(anyhow!("code exchange request failed: {err}")))?;

    if !response.status().is_success() {
        error!("code exchange failed with status {}", response.status());
        return Err(AuthError::validation("code", "Code exchange failed"));
    }

    response
        .json::<serde_json::Value>()
        .await
        .map_err(|err| AuthError::Internal(anyhow!("invalid token response: {err}")))
}

async fn fetch_userinfo(access_token: &str) -> Result<serde_json::Value, AuthError> {
    let client = reqwest::Client::builder()
        .user_agent(crate::APP_USER_AGENT)
        .build()
        .map_err(|err| AuthError::Internal(anyhow!("failed to build http client: {err}")))?;

    client
        .get(USERINFO_ENDPOINT)
        .bearer_auth(access_token)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|err| AuthError::Internal(anyhow!("userinfo request failed: {err}")))?
        .json::<serde_json::Value>()
        .await
        .map_err(|err| AuthError::Internal(anyhow!("invalid userinfo response: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::AuthConfig;

    fn state_with(frontend: &str, extras: Vec<String>) -> AuthState {
        let config = AuthConfig::new(
            SecretString::from("session".to_string()),
            SecretString::from("seed".to_string()),
            SecretString::from("state".to_string()),
            frontend.to_string(),
        )
        .with_cors_allow_origins(extras);
        AuthState::new(config, None)
    }

    #[test]
    fn return_to_must_match_an_allowed_origin() {
        let state = state_with("https://app.vellum.dev", Vec::new());

        assert!(validate_return_to(&state, "https://app.vellum.dev/docs/42").is_ok());
        assert!(validate_return_to(&state, "https://evil.example.com/").is_err());
        // Same host, different scheme is a different origin.
        assert!(validate_return_to(&state, "http://app.vellum.dev/").is_err());
        assert!(validate_return_to(&state, "not a url").is_err());
    }

    #[test]
    fn return_to_accepts_cors_extras_and_localhost_alias() {
        let state = state_with(
            "http://localhost:5173",
            vec!["https://staging.vellum.dev".to_string()],
        );

        assert!(validate_return_to(&state, "http://127.0.0.1:5173/home").is_ok());
        assert!(validate_return_to(&state, "https://staging.vellum.dev/x").is_ok());
        assert!(validate_return_to(&state, "http://localhost:9999/").is_err());
    }

    #[test]
    fn missing_google_config_is_a_configuration_error() {
        let state = state_with("https://app.vellum.dev", Vec::new());
        assert!(matches!(
            require_google(&state),
            Err(AuthError::Configuration(_))
        ));
    }
}
