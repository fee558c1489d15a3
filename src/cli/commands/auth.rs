use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;

pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_SEED_SECRET: &str = "seed-secret";
pub const ARG_STATE_SECRET: &str = "state-secret";
pub const ARG_GOOGLE_CLIENT_ID: &str = "google-client-id";
pub const ARG_GOOGLE_CLIENT_SECRET: &str = "google-client-secret";
pub const ARG_GOOGLE_REDIRECT_URL: &str = "google-redirect-url";

// 14 days
const DEFAULT_SESSION_TTL_SECONDS: i64 = 14 * 24 * 60 * 60;

pub fn with_args(command: Command) -> Command {
    let command = with_secret_args(command);
    let command = with_session_args(command);
    with_google_args(command)
}

fn with_secret_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("Symmetric secret used to sign session tokens")
                .env("VELLUM_SESSION_SECRET")
                .required(true),
        )
        .arg(
            Arg::new(ARG_SEED_SECRET)
                .long(ARG_SEED_SECRET)
                .help("Secret used to derive the seed-phrase lookup key")
                .env("VELLUM_SEED_SECRET")
                .required(true),
        )
        .arg(
            Arg::new(ARG_STATE_SECRET)
                .long(ARG_STATE_SECRET)
                .help("Secret used to sign the OAuth state parameter")
                .env("VELLUM_STATE_SECRET")
                .required(true),
        )
}

fn with_session_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Session token lifetime in seconds")
                .env("VELLUM_SESSION_TTL_SECONDS")
                .default_value("1209600")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("frontend-base-url")
                .long("frontend-base-url")
                .help("Frontend base URL, used for CORS and redirect validation")
                .env("VELLUM_FRONTEND_BASE_URL")
                .default_value("http://localhost:5173"),
        )
        .arg(
            Arg::new("cors-allow-origins")
                .long("cors-allow-origins")
                .help("Comma-separated list of extra allowed origins")
                .env("VELLUM_CORS_ALLOW_ORIGINS"),
        )
}

fn with_google_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_GOOGLE_CLIENT_ID)
                .long(ARG_GOOGLE_CLIENT_ID)
                .help("Google OAuth client id")
                .env("VELLUM_GOOGLE_CLIENT_ID"),
        )
        .arg(
            Arg::new(ARG_GOOGLE_CLIENT_SECRET)
                .long(ARG_GOOGLE_CLIENT_SECRET)
                .help("Google OAuth client secret")
                .env("VELLUM_GOOGLE_CLIENT_SECRET"),
        )
        .arg(
            Arg::new(ARG_GOOGLE_REDIRECT_URL)
                .long(ARG_GOOGLE_REDIRECT_URL)
                .help("Google OAuth redirect URL pointing back at this server")
                .env("VELLUM_GOOGLE_REDIRECT_URL"),
        )
}

/// Auth arguments parsed out of the clap matches.
#[derive(Debug)]
pub struct Options {
    pub session_secret: SecretString,
    pub seed_secret: SecretString,
    pub state_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub frontend_base_url: String,
    pub cors_allow_origins: Vec<String>,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<SecretString>,
    pub google_redirect_url: Option<String>,
}

impl Options {
    /// Parse auth options from validated matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let secret = |arg: &str| -> Result<SecretString> {
            matches
                .get_one::<String>(arg)
                .map(|value| SecretString::from(value.clone()))
                .with_context(|| format!("missing required argument: --{arg}"))
        };

        let cors_allow_origins = matches
            .get_one::<String>("cors-allow-origins")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            session_secret: secret(ARG_SESSION_SECRET)?,
            seed_secret: secret(ARG_SEED_SECRET)?,
            state_secret: secret(ARG_STATE_SECRET)?,
            session_ttl_seconds: matches
                .get_one::<i64>("session-ttl-seconds")
                .copied()
                .unwrap_or(DEFAULT_SESSION_TTL_SECONDS),
            frontend_base_url: matches
                .get_one::<String>("frontend-base-url")
                .cloned()
                .context("missing required argument: --frontend-base-url")?,
            cors_allow_origins,
            google_client_id: matches.get_one::<String>(ARG_GOOGLE_CLIENT_ID).cloned(),
            google_client_secret: matches
                .get_one::<String>(ARG_GOOGLE_CLIENT_SECRET)
                .map(|value| SecretString::from(value.clone())),
            google_redirect_url: matches.get_one::<String>(ARG_GOOGLE_REDIRECT_URL).cloned(),
        })
    }
}
