//! # Vellum (document workspace backend, auth core)
//!
//! `vellum` is the backend for the Vellum document workspace. This crate
//! carries its identity core: credential issuance and session/state
//! authentication. Document storage, template rendering, and provider
//! integrations consume the identity this core produces.
//!
//! ## Dual-mode login
//!
//! Accounts authenticate with either a password or a mnemonic seed phrase.
//! Registration returns the seed phrase exactly once; only derived values
//! (a deterministic lookup key and a salted slow hash) are stored.
//!
//! ## Sessions
//!
//! Sessions are stateless, signed claim bundles (`HS256`). Validity is
//! determined entirely by signature and expiry; there is no server-side
//! session store and no revocation list. Expiry is the only lifetime bound.
//!
//! ## OAuth linking
//!
//! The Google Drive link flow round-trips a signed, time-bounded state
//! parameter through the provider redirect so the callback can be tied to a
//! request this server actually issued. The decoded redirect target is
//! additionally checked against an explicit origin allow-list.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
