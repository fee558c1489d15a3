//! Signed state parameter for the OAuth redirect round trip.
//!
//! The state carries the post-login redirect target through the provider
//! redirect and proves, on callback, that the value originated here (CSRF
//! defense). The envelope is `base64url(ts|return_to|sig)` with
//! `sig = base64url(HMAC-SHA256(secret, "ts|return_to"))`, valid for a
//! fixed 30-minute window that bounds replay of an intercepted value.
//!
//! A valid signature does not make the redirect safe: callers must still
//! check the decoded `return_to` against the origin allow-list.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Replay window for an issued state value.
const STATE_TTL_SECONDS: i64 = 30 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("malformed state")]
    Malformed,
    #[error("invalid state signature")]
    InvalidSignature,
    #[error("state expired")]
    Expired,
}

fn sign(secret: &SecretString, payload: &str) -> Result<String, StateError> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| StateError::InvalidSignature)?;
    mac.update(payload.as_bytes());
    Ok(Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes()))
}

/// Encode a signed state value carrying `return_to`.
pub(crate) fn encode_state(secret: &SecretString, return_to: &str) -> Result<String, StateError> {
    encode_state_at(secret, return_to, Utc::now().timestamp())
}

fn encode_state_at(
    secret: &SecretString,
    return_to: &str,
    now: i64,
) -> Result<String, StateError> {
    let payload = format!("{now}|{return_to}");
    let signature = sign(secret, &payload)?;
    Ok(Base64UrlUnpadded::encode_string(
        format!("{payload}|{signature}").as_bytes(),
    ))
}

/// Decode and validate a state value, returning the embedded `return_to`.
///
/// Fails uniformly for malformed encodings, bad signatures, and expired
/// timestamps; HTTP callers present all three as the same invalid-state
/// rejection.
pub(crate) fn decode_state(secret: &SecretString, state: &str) -> Result<String, StateError> {
    decode_state_at(secret, state, Utc::now().timestamp())
}

fn decode_state_at(secret: &SecretString, state: &str, now: i64) -> Result<String, StateError> {
    let raw = Base64UrlUnpadded::decode_vec(state).map_err(|_| StateError::Malformed)?;
    let raw = String::from_utf8(raw).map_err(|_| StateError::Malformed)?;

    let mut parts = raw.splitn(3, '|');
    let (Some(timestamp), Some(return_to), Some(signature)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(StateError::Malformed);
    };

    let payload = format!("{timestamp}|{return_to}");
    let signature =
        Base64UrlUnpadded::decode_vec(signature).map_err(|_| StateError::Malformed)?;
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| StateError::InvalidSignature)?;
    mac.update(payload.as_bytes());
    // Constant-time comparison.
    mac.verify_slice(&signature)
        .map_err(|_| StateError::InvalidSignature)?;

    let timestamp: i64 = timestamp.parse().map_err(|_| StateError::Malformed)?;
    if now - timestamp > STATE_TTL_SECONDS {
        return Err(StateError::Expired);
    }

    Ok(return_to.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn round_trip_within_window() {
        let key = secret("state-secret");
        let state = encode_state(&key, "https://app.vellum.dev/settings").expect("encode");
        assert_eq!(
            decode_state(&key, &state).as_deref(),
            Ok("https://app.vellum.dev/settings")
        );
    }

    #[test]
    fn expires_after_thirty_minutes() {
        let key = secret("state-secret");
        let state = encode_state_at(&key, "https://app.vellum.dev", 1_000).expect("encode");

        assert_eq!(
            decode_state_at(&key, &state, 1_000 + STATE_TTL_SECONDS),
            Ok("https://app.vellum.dev".to_string())
        );
        assert_eq!(
            decode_state_at(&key, &state, 1_001 + STATE_TTL_SECONDS),
            Err(StateError::Expired)
        );
    }

    #[test]
    fn flipped_signature_byte_is_rejected() {
        let key = secret("state-secret");
        let state = encode_state(&key, "https://app.vellum.dev").expect("encode");

        let mut raw = Base64UrlUnpadded::decode_vec(&state).expect("decode");
        let last = raw.len() - 1;
        // The payload ends with the base64url signature; flip a byte of it.
        raw[last] = if raw[last] == b'A' { b'B' } else { b'A' };
        let tampered = Base64UrlUnpadded::encode_string(&raw);

        assert!(matches!(
            decode_state(&key, &tampered),
            Err(StateError::Malformed | StateError::InvalidSignature)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let state = encode_state(&secret("one"), "https://app.vellum.dev").expect("encode");
        assert_eq!(
            decode_state(&secret("two"), &state),
            Err(StateError::InvalidSignature)
        );
    }

    #[test]
    fn malformed_states_are_rejected() {
        let key = secret("state-secret");
        assert_eq!(decode_state(&key, "%%%"), Err(StateError::Malformed));
        assert_eq!(
            decode_state(&key, &Base64UrlUnpadded::encode_string(b"no pipes here")),
            Err(StateError::Malformed)
        );
        assert_eq!(decode_state(&key, ""), Err(StateError::Malformed));
    }

    #[test]
    fn return_to_with_query_round_trips() {
        let key = secret("state-secret");
        let url = "https://app.vellum.dev/docs?id=42&tab=preview";
        let state = encode_state(&key, url).expect("encode");
        assert_eq!(decode_state(&key, &state).as_deref(), Ok(url));
    }
}
