//! Auth configuration and shared state.
//!
//! Configuration is an explicit value constructed once at startup and passed
//! into the router as an extension; component logic never reaches for an
//! ambient global. Everything here is read-only after startup.

use anyhow::{anyhow, Result};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashSet;
use url::Url;

use crate::api::handlers::google::GoogleConfig;

// 14 days
const DEFAULT_SESSION_TTL_SECONDS: i64 = 14 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_secret: SecretString,
    seed_secret: SecretString,
    state_secret: SecretString,
    session_ttl_seconds: i64,
    frontend_base_url: String,
    cors_allow_origins: Vec<String>,
}

impl AuthConfig {
    #[must_use]
    pub fn new(
        session_secret: SecretString,
        seed_secret: SecretString,
        state_secret: SecretString,
        frontend_base_url: String,
    ) -> Self {
        Self {
            session_secret,
            seed_secret,
            state_secret,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            frontend_base_url,
            cors_allow_origins: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cors_allow_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_allow_origins = origins;
        self
    }

    /// Fail-closed startup check: every auth operation depends on these
    /// secrets, so refuse to serve anything if one is missing.
    ///
    /// # Errors
    /// Returns an error naming the first empty secret.
    pub fn validate(&self) -> Result<()> {
        for (name, secret) in [
            ("VELLUM_SESSION_SECRET", &self.session_secret),
            ("VELLUM_SEED_SECRET", &self.seed_secret),
            ("VELLUM_STATE_SECRET", &self.state_secret),
        ] {
            if secret.expose_secret().trim().is_empty() {
                return Err(anyhow!("{name} is not configured"));
            }
        }
        Ok(())
    }

    pub(crate) fn session_secret(&self) -> &SecretString {
        &self.session_secret
    }

    pub(crate) fn seed_secret(&self) -> &SecretString {
        &self.seed_secret
    }

    pub(crate) fn state_secret(&self) -> &SecretString {
        &self.state_secret
    }

    pub(crate) fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    /// Origins allowed for CORS and as OAuth redirect targets.
    ///
    /// The frontend base URL and any extra CORS origins, reduced to
    /// `scheme://host[:port]`. `localhost` and `127.0.0.1` are treated as
    /// aliases of each other so dev setups do not break on the spelling.
    pub(crate) fn allowed_origins(&self) -> HashSet<String> {
        let mut candidates: Vec<String> = Vec::new();
        candidates.push(self.frontend_base_url.trim_end_matches('/').to_string());
        for origin in &self.cors_allow_origins {
            candidates.push(origin.trim().trim_end_matches('/').to_string());
        }

        for candidate in candidates.clone() {
            if let Some(rest) = candidate.strip_prefix("http://localhost:") {
                candidates.push(format!("http://127.0.0.1:{rest}"));
            }
            if let Some(rest) = candidate.strip_prefix("http://127.0.0.1:") {
                candidates.push(format!("http://localhost:{rest}"));
            }
        }

        candidates
            .iter()
            .filter_map(|candidate| {
                let parsed = Url::parse(candidate).ok()?;
                let host = parsed.host_str()?;
                let port = parsed
                    .port()
                    .map_or_else(String::new, |port| format!(":{port}"));
                Some(format!("{}://{host}{port}", parsed.scheme()))
            })
            .collect()
    }
}

pub struct AuthState {
    config: AuthConfig,
    google: Option<GoogleConfig>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, google: Option<GoogleConfig>) -> Self {
        Self { config, google }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn google(&self) -> Option<&GoogleConfig> {
        self.google.as_ref()
    }
}
