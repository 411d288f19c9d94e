//! Request signing for slash-command webhooks.
//!
//! Implements the Slack `v0` signing scheme: an HMAC-SHA256 over the
//! basestring `v0:<timestamp>:<raw body>`, hex-encoded and prefixed with
//! `v0=`. Verification compares against the supplied header value with a
//! constant-time comparison.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Protocol version prefix used in the basestring and the signature.
pub const SIGNATURE_VERSION: &str = "v0";

/// Signature computation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The signing secret could not be used as an HMAC key.
    #[error("invalid signing secret")]
    InvalidSecret,
}

/// Computes the expected signature header value for a request.
///
/// The signature is computed over the exact raw body bytes; any
/// re-serialization of the body would invalidate it.
///
/// # Errors
///
/// Returns `SignatureError::InvalidSecret` if the secret cannot key the MAC.
pub fn compute_signature(
    secret: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::InvalidSecret)?;

    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);

    let digest = mac.finalize();
    Ok(format!("{SIGNATURE_VERSION}={}", hex::encode(digest.into_bytes())))
}

/// Verifies a supplied signature header against the computed value.
///
/// Missing headers should be passed as empty strings; they can never match.
/// Returns `false` rather than an error on any failure so callers leak
/// nothing about why verification failed.
pub fn verify_signature(secret: &str, timestamp: &str, body: &[u8], provided: &str) -> bool {
    match compute_signature(secret, timestamp, body) {
        Ok(expected) => timing_safe_eq(&expected, provided),
        Err(_) => false,
    }
}

/// Timing-safe string comparison to prevent timing attacks.
fn timing_safe_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (a_byte, b_byte) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        result |= a_byte ^ b_byte;
    }

    result == 0
}
