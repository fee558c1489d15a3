//! Auth handlers and supporting modules.
//!
//! This module carries the identity core: dual-mode login (password or seed
//! phrase), stateless session tokens, and the signed state parameter used by
//! the OAuth link flow.
//!
//! ## Secrets
//!
//! Three symmetric secrets are mandatory: session signing, seed lookup-key
//! derivation, and OAuth state signing. Their presence is verified at
//! startup, before the server binds. Rotating the seed secret orphans every
//! stored `seed_key`, which silently disables seed-phrase login for existing
//! accounts; treat it like a data migration, not a credential roll.

pub(crate) mod credentials;
pub(crate) mod error;
pub(crate) mod login;
pub(crate) mod me;
pub(crate) mod oauth_state;
pub(crate) mod principal;
pub(crate) mod register;
pub(crate) mod seed;
mod state;
mod storage;
pub(crate) mod token;
pub(crate) mod types;
mod utils;

pub use state::{AuthConfig, AuthState};
