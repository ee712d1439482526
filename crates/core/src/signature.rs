//! Request-signature verification for inbound Slack traffic.
//!
//! Slack signs every request with `HMAC-SHA256(secret, "v0:{timestamp}:{body}")`
//! and sends the hex digest as `X-Slack-Signature: v0=...` alongside
//! `X-Slack-Request-Timestamp`. Verification gates every endpoint; nothing is
//! parsed before the signature checks out.

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted clock skew between the request timestamp and now.
pub const REPLAY_WINDOW_SECS: i64 = 300;

const SIGNATURE_PREFIX: &str = "v0=";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("request is missing a signature or timestamp header")]
    MissingHeader,
    #[error("request timestamp is not a unix timestamp")]
    MalformedTimestamp,
    #[error("request timestamp is outside the replay window")]
    StaleTimestamp,
    #[error("request signature does not match")]
    Mismatch,
}

pub struct SignatureVerifier {
    signing_secret: SecretString,
}

impl SignatureVerifier {
    pub fn new(signing_secret: SecretString) -> Self {
        Self { signing_secret }
    }

    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &str,
    ) -> Result<(), SignatureError> {
        self.verify_at(timestamp, signature, body, Utc::now().timestamp())
    }

    /// Verification against an explicit clock, so the replay window is
    /// testable without waiting.
    pub fn verify_at(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &str,
        now: i64,
    ) -> Result<(), SignatureError> {
        let timestamp = timestamp.ok_or(SignatureError::MissingHeader)?;
        let signature = signature.ok_or(SignatureError::MissingHeader)?;

        let seconds: i64 =
            timestamp.trim().parse().map_err(|_| SignatureError::MalformedTimestamp)?;
        if (now - seconds).abs() > REPLAY_WINDOW_SECS {
            return Err(SignatureError::StaleTimestamp);
        }

        // A malformed signature (wrong prefix, bad hex) is a mismatch, never
        // a propagated parse failure.
        let supplied = signature
            .strip_prefix(SIGNATURE_PREFIX)
            .and_then(decode_hex)
            .ok_or(SignatureError::Mismatch)?;

        let mut mac =
            match HmacSha256::new_from_slice(self.signing_secret.expose_secret().as_bytes()) {
                Ok(mac) => mac,
                Err(_) => return Err(SignatureError::Mismatch),
            };
        mac.update(base_string(timestamp, body).as_bytes());
        mac.verify_slice(&supplied).map_err(|_| SignatureError::Mismatch)
    }

    /// The signature this verifier would accept for the given request.
    pub fn expected_signature(&self, timestamp: &str, body: &str) -> String {
        let digest = hmac_hex(self.signing_secret.expose_secret().as_bytes(), timestamp, body);
        format!("{SIGNATURE_PREFIX}{digest}")
    }
}

fn base_string(timestamp: &str, body: &str) -> String {
    format!("v0:{timestamp}:{body}")
}

fn hmac_hex(secret: &[u8], timestamp: &str, body: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(base_string(timestamp, body).as_bytes());
    encode_hex(mac.finalize().into_bytes().as_slice())
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}

fn decode_hex(value: &str) -> Option<Vec<u8>> {
    if value.len() % 2 != 0 {
        return None;
    }
    (0..value.len())
        .step_by(2)
        .map(|index| u8::from_str_radix(value.get(index..index + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{SignatureError, SignatureVerifier, REPLAY_WINDOW_SECS};

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const BODY: &str = "payload=%7B%22type%22%3A%22view_submission%22%7D";
    const TIMESTAMP: &str = "1757980800";
    const NOW: i64 = 1757980800;

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SECRET.to_string().into())
    }

    #[test]
    fn accepts_a_correctly_signed_request() {
        let verifier = verifier();
        let signature = verifier.expected_signature(TIMESTAMP, BODY);

        assert_eq!(
            verifier.verify_at(Some(TIMESTAMP), Some(&signature), BODY, NOW),
            Ok(())
        );
    }

    #[test]
    fn accepts_skew_up_to_the_replay_window() {
        let verifier = verifier();
        let signature = verifier.expected_signature(TIMESTAMP, BODY);

        assert_eq!(
            verifier.verify_at(Some(TIMESTAMP), Some(&signature), BODY, NOW + REPLAY_WINDOW_SECS),
            Ok(())
        );
        assert_eq!(
            verifier.verify_at(Some(TIMESTAMP), Some(&signature), BODY, NOW - REPLAY_WINDOW_SECS),
            Ok(())
        );
    }

    #[test]
    fn rejects_a_stale_timestamp_even_with_a_valid_signature() {
        let verifier = verifier();
        let signature = verifier.expected_signature(TIMESTAMP, BODY);

        assert_eq!(
            verifier.verify_at(
                Some(TIMESTAMP),
                Some(&signature),
                BODY,
                NOW + REPLAY_WINDOW_SECS + 1
            ),
            Err(SignatureError::StaleTimestamp)
        );
    }

    #[test]
    fn rejects_missing_headers() {
        let verifier = verifier();
        let signature = verifier.expected_signature(TIMESTAMP, BODY);

        assert_eq!(
            verifier.verify_at(None, Some(&signature), BODY, NOW),
            Err(SignatureError::MissingHeader)
        );
        assert_eq!(
            verifier.verify_at(Some(TIMESTAMP), None, BODY, NOW),
            Err(SignatureError::MissingHeader)
        );
    }

    #[test]
    fn rejects_a_tampered_body() {
        let verifier = verifier();
        let signature = verifier.expected_signature(TIMESTAMP, BODY);
        let tampered = format!("{BODY}x");

        assert_eq!(
            verifier.verify_at(Some(TIMESTAMP), Some(&signature), &tampered, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_a_bit_flipped_signature() {
        let verifier = verifier();
        let mut signature = verifier.expected_signature(TIMESTAMP, BODY);
        let last = signature.pop().map(|ch| if ch == '0' { '1' } else { '0' });
        signature.push(last.unwrap_or('0'));

        assert_eq!(
            verifier.verify_at(Some(TIMESTAMP), Some(&signature), BODY, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_malformed_signatures_without_panicking() {
        let verifier = verifier();

        for bad in ["", "v0=", "v0=zz", "sha256=abdef0", "v0=abc"] {
            assert_eq!(
                verifier.verify_at(Some(TIMESTAMP), Some(bad), BODY, NOW),
                Err(SignatureError::Mismatch),
                "expected `{bad}` to be rejected"
            );
        }
    }

    #[test]
    fn rejects_a_non_numeric_timestamp() {
        let verifier = verifier();
        let signature = verifier.expected_signature("not-a-number", BODY);

        assert_eq!(
            verifier.verify_at(Some("not-a-number"), Some(&signature), BODY, NOW),
            Err(SignatureError::MalformedTimestamp)
        );
    }

    #[test]
    fn rejects_when_the_secret_differs() {
        let signature = verifier().expected_signature(TIMESTAMP, BODY);
        let other = SignatureVerifier::new("different-secret".to_string().into());

        assert_eq!(
            other.verify_at(Some(TIMESTAMP), Some(&signature), BODY, NOW),
            Err(SignatureError::Mismatch)
        );
    }
}
