use crate::api::{
    self,
    handlers::{auth::AuthConfig, google::GoogleConfig},
};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
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

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is incomplete or the server fails
/// to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(
        args.session_secret,
        args.seed_secret,
        args.state_secret,
        args.frontend_base_url,
    )
    .with_session_ttl_seconds(args.session_ttl_seconds)
    .with_cors_allow_origins(args.cors_allow_origins);

    // All three secrets must be present before any auth operation runs.
    auth_config.validate()?;

    let google_config = match (
        args.google_client_id,
        args.google_client_secret,
        args.google_redirect_url,
    ) {
        (Some(client_id), Some(client_secret), Some(redirect_url)) => {
            Some(GoogleConfig::new(client_id, client_secret, redirect_url))
        }
        _ => None,
    };

    api::new(args.port, args.dsn, auth_config, google_config).await
}
