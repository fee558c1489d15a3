//! Stateless session tokens.
//!
//! Compact `header.claims.signature` tokens signed with HMAC-SHA256. Validity
//! is entirely determined by signature and expiry; nothing is persisted and
//! there is no revocation list.
//!
//! `decode` reports the failure kind so tests and logs can tell a tampered
//! token from an expired one. HTTP callers must collapse every variant into
//! the same 401: the distinction never reaches the end user.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct SessionHeader {
    alg: String,
    typ: String,
}

impl SessionHeader {
    fn hs256() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Identity claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject: the user id.
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signing key")]
    Key,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("missing claim: {0}")]
    MissingClaim(&'static str),
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(part: &str) -> Result<T, TokenError> {
    let bytes = Base64UrlUnpadded::decode_vec(part).map_err(|_| TokenError::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn mac(secret: &SecretString, message: &str) -> Result<HmacSha256, TokenError> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| TokenError::Key)?;
    mac.update(message.as_bytes());
    Ok(mac)
}

/// Issue a signed session token for `subject`, valid for `ttl_seconds`.
pub(crate) fn issue(
    secret: &SecretString,
    subject: Uuid,
    email: &str,
    ttl_seconds: i64,
) -> Result<String, TokenError> {
    issue_at(secret, subject, email, ttl_seconds, Utc::now().timestamp())
}

fn issue_at(
    secret: &SecretString,
    subject: Uuid,
    email: &str,
    ttl_seconds: i64,
    now: i64,
) -> Result<String, TokenError> {
    let claims = SessionClaims {
        sub: subject,
        email: email.to_string(),
        iat: now,
        exp: now + ttl_seconds,
    };

    let signing_input = format!("{}.{}", b64e_json(&SessionHeader::hs256())?, b64e_json(&claims)?);
    let signature = mac(secret, &signing_input)?.finalize().into_bytes();

    Ok(format!(
        "{signing_input}.{}",
        Base64UrlUnpadded::encode_string(&signature)
    ))
}

/// Decode and validate a session token.
///
/// Never panics on malformed input; every failure is a named variant.
pub(crate) fn decode(secret: &SecretString, token: &str) -> Result<SessionClaims, TokenError> {
    decode_at(secret, token, Utc::now().timestamp())
}

fn decode_at(secret: &SecretString, token: &str, now: i64) -> Result<SessionClaims, TokenError> {
    let mut parts = token.split('.');
    let (Some(header_part), Some(claims_part), Some(signature_part), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::TokenFormat);
    };

    let header: SessionHeader = b64d_json(header_part)?;
    if header.alg != "HS256" {
        return Err(TokenError::UnsupportedAlg(header.alg));
    }

    // Verify the signature before trusting anything in the claims.
    let signature = Base64UrlUnpadded::decode_vec(signature_part).map_err(|_| TokenError::Base64)?;
    let signing_input = format!("{header_part}.{claims_part}");
    mac(secret, &signing_input)?
        .verify_slice(&signature)
        .map_err(|_| TokenError::InvalidSignature)?;

    let claims: SessionClaims = b64d_json(claims_part)?;
    if claims.email.is_empty() {
        return Err(TokenError::MissingClaim("email"));
    }
    if claims.exp <= now {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: i64 = 14 * 24 * 60 * 60;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    fn subject() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn round_trip_before_expiry() {
        let key = secret("session-secret");
        let uid = subject();
        let token = issue(&key, uid, "alice@example.com", TTL).expect("issue");

        let claims = decode(&key, &token).expect("decode");
        assert_eq!(claims.sub, uid);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.exp, claims.iat + TTL);
    }

    #[test]
    fn expired_token_is_rejected() {
        let key = secret("session-secret");
        let token =
            issue_at(&key, subject(), "alice@example.com", 60, 1_000).expect("issue");

        assert!(matches!(
            decode_at(&key, &token, 1_061),
            Err(TokenError::Expired)
        ));
        // Still valid one second before the boundary.
        assert!(decode_at(&key, &token, 1_059).is_ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token =
            issue(&secret("one"), subject(), "alice@example.com", TTL).expect("issue");
        assert!(matches!(
            decode(&secret("two"), &token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let key = secret("session-secret");
        let token = issue(&key, subject(), "alice@example.com", TTL).expect("issue");

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = b64e_json(&SessionClaims {
            sub: subject(),
            email: "mallory@example.com".to_string(),
            iat: 0,
            exp: i64::MAX,
        })
        .expect("encode");
        parts[1] = &forged;
        let tampered = parts.join(".");

        assert!(matches!(
            decode(&key, &tampered),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn malformed_tokens_are_named_failures() {
        let key = secret("session-secret");
        assert!(matches!(
            decode(&key, "only.two"),
            Err(TokenError::TokenFormat)
        ));
        assert!(matches!(
            decode(&key, "a.b.c.d"),
            Err(TokenError::TokenFormat)
        ));
        assert!(matches!(
            decode(&key, "!!!.???.###"),
            Err(TokenError::Base64)
        ));
        assert!(decode(&key, "").is_err());
    }

    #[test]
    fn unsupported_algorithm_is_rejected() {
        let key = secret("session-secret");
        let header = b64e_json(&SessionHeader {
            alg: "none".to_string(),
            typ: "JWT".to_string(),
        })
        .expect("encode");
        let claims = b64e_json(&SessionClaims {
            sub: subject(),
            email: "alice@example.com".to_string(),
            iat: 0,
            exp: i64::MAX,
        })
        .expect("encode");
        let token = format!("{header}.{claims}.{}", Base64UrlUnpadded::encode_string(b""));

        assert!(matches!(
            decode(&key, &token),
            Err(TokenError::UnsupportedAlg(alg)) if alg == "none"
        ));
    }

    #[test]
    fn empty_email_claim_is_rejected() {
        let key = secret("session-secret");
        let token = issue(&key, subject(), "", TTL).expect("issue");
        assert!(matches!(
            decode(&key, &token),
            Err(TokenError::MissingClaim("email"))
        ));
    }
}
