//! Credential derivation and verification.
//!
//! Passwords go through a two-stage pipeline: a SHA-256 pre-hash and then
//! Argon2id. The pre-hash is not incidental: adaptive password hashes have an
//! input-length ceiling (bcrypt truncates at 72 bytes), so the pre-hash maps
//! arbitrarily long passwords to a fixed 64-char hex string before the slow
//! hash ever sees them.
//!
//! Seed phrases get two independent derivations of the same normalized text:
//!
//! - `seed_key`: keyed HMAC-SHA256, hex encoded. Deterministic, so the users
//!   table can find the candidate row with an indexed equality lookup.
//! - `hash_seed`/`verify_seed`: salted Argon2id, used only to confirm the
//!   match after lookup.
//!
//! Keep both. The lookup key is invertible by anyone holding the seed
//! secret; the salted slow hash means a leaked secret still does not become
//! an offline guessing oracle. Collapsing the two into one derivation
//! removes that property.

use anyhow::{anyhow, Result};
use argon2::Argon2;
use hmac::{Hmac, Mac};
use password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use super::seed::normalize_seed;

type HmacSha256 = Hmac<Sha256>;

/// Minimum number of normalized words a login seed phrase must have.
/// Checked before any database or slow-hash work.
pub(crate) const MIN_SEED_WORDS: usize = 6;

/// Fixed-length pre-hash applied to passwords before the slow hash.
fn digest_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash a password for storage (PHC string, random salt).
pub(crate) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(digest_password(password).as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("failed to hash password: {err}"))
}

/// Verify a password against a stored hash.
/// Malformed stored hashes verify as false rather than erroring.
pub(crate) fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(digest_password(password).as_bytes(), &parsed)
            .is_ok()
    })
}

/// Deterministic lookup key for a seed phrase, hex encoded.
pub(crate) fn seed_key(seed_secret: &SecretString, seed_phrase: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(seed_secret.expose_secret().as_bytes())
        .map_err(|err| anyhow!("invalid seed secret: {err}"))?;
    mac.update(normalize_seed(seed_phrase).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Salted, slow confirmation hash of a seed phrase.
pub(crate) fn hash_seed(seed_phrase: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(normalize_seed(seed_phrase).as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("failed to hash seed phrase: {err}"))
}

/// Verify a seed phrase against its stored confirmation hash.
pub(crate) fn verify_seed(seed_phrase: &str, seed_hash: &str) -> bool {
    PasswordHash::new(seed_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(normalize_seed(seed_phrase).as_bytes(), &parsed)
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("secret1").expect("hash should succeed");
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
    }

    #[test]
    fn long_passwords_are_not_truncated() {
        // bcrypt would treat these as equal past byte 72; the pre-hash stage
        // must keep them distinct.
        let prefix = "x".repeat(72);
        let first = format!("{prefix}-alpha");
        let second = format!("{prefix}-bravo");

        let hash = hash_password(&first).expect("hash should succeed");
        assert!(verify_password(&first, &hash));
        assert!(!verify_password(&second, &hash));
    }

    #[test]
    fn verify_password_rejects_malformed_hash() {
        assert!(!verify_password("secret1", "not-a-phc-string"));
    }

    #[test]
    fn stored_hashes_are_phc_argon2id() {
        let hash = hash_password("secret1").expect("hash should succeed");
        let parsed = PasswordHash::new(&hash).expect("stored hash should be a PHC string");
        assert_eq!(parsed.algorithm.as_str(), "argon2id");

        let hash = hash_seed("apple bench raven comet lunar pixel").expect("hash should succeed");
        let parsed = PasswordHash::new(&hash).expect("stored hash should be a PHC string");
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
    }

    #[test]
    fn seed_key_is_deterministic_for_a_fixed_secret() {
        let key = seed_key(&secret("k1"), "apple bench raven comet lunar pixel");
        let again = seed_key(&secret("k1"), "  Apple  BENCH raven comet lunar pixel ");
        assert_eq!(key.ok(), again.ok());
    }

    #[test]
    fn seed_key_varies_with_the_secret() {
        let phrase = "apple bench raven comet lunar pixel";
        let first = seed_key(&secret("k1"), phrase).expect("seed key");
        let second = seed_key(&secret("k2"), phrase).expect("seed key");
        assert_ne!(first, second);
    }

    #[test]
    fn seed_key_is_lowercase_hex_sha256_sized() {
        let key = seed_key(&secret("k1"), "apple bench").expect("seed key");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn seed_round_trip() {
        let phrase = "apple bench raven comet lunar pixel";
        let hash = hash_seed(phrase).expect("hash should succeed");
        assert!(verify_seed(phrase, &hash));
        assert!(verify_seed("  APPLE bench raven comet lunar pixel ", &hash));
        assert!(!verify_seed("wrong words entirely here apple bench", &hash));
    }

    #[test]
    fn seed_hashes_are_salted() {
        let phrase = "apple bench raven comet lunar pixel";
        let first = hash_seed(phrase).expect("hash");
        let second = hash_seed(phrase).expect("hash");
        assert_ne!(first, second);
    }
}
