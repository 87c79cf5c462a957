//! Security utilities for LINE webhook verification
//!
//! This module provides signature verification for incoming LINE webhook requests
//! using the `X-Line-Signature` header. This ensures that requests actually originate
//! from the LINE Platform and haven't been tampered with.
//!
//! # Security Background
//!
//! LINE signs all webhook payloads with HMAC-SHA256 using the channel secret.
//! The digest is sent base64 encoded, without any prefix, in `X-Line-Signature`.
//!
//! To verify authenticity:
//! 1. Read the header value
//! 2. Compute HMAC-SHA256 of the raw request body using the channel secret
//! 3. Compare the base64 encoded digest with the received signature
//! 4. Only process the request if signatures match
//!
//! # Important Notes
//!
//! - The signature MUST be computed on the raw request body bytes, not parsed JSON
//! - An absent header or an empty body is a verification failure, never an error

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes the base64 encoded HMAC-SHA256 of `payload` keyed by `channel_secret`.
///
/// This is the value LINE puts in `X-Line-Signature`; the operator scripts use
/// it to sign test deliveries.
pub fn compute_signature(payload: &[u8], channel_secret: &[u8]) -> String {
    // HMAC accepts keys of any length, the error branch is unreachable
    let mut mac = <HmacSha256 as Mac>::new_from_slice(channel_secret)
        .unwrap_or_else(|_| unreachable!("HMAC-SHA256 accepts keys of any size"));
    mac.update(payload);

    STANDARD.encode(mac.finalize().into_bytes())
}

/// Verifies the `X-Line-Signature` header against the request payload
///
/// # Arguments
///
/// * `signature_header` - The value of the `X-Line-Signature` header, if any
/// * `payload` - The raw request body bytes
/// * `channel_secret` - The LINE channel secret
///
/// # Returns
///
/// * `true` if the header is present, the body is non-empty, a secret is
///   configured and the signature matches
/// * `false` otherwise
pub fn verify_signature(
    signature_header: Option<&str>,
    payload: &[u8],
    channel_secret: &[u8],
) -> bool {
    let Some(signature) = signature_header else {
        logfire::warn!("Missing X-Line-Signature header");
        return false;
    };

    if payload.is_empty() {
        logfire::warn!("Empty webhook body, nothing to verify");
        return false;
    }

    if channel_secret.is_empty() {
        logfire::error!("LINE channel secret is not configured, rejecting webhook");
        return false;
    }

    let computed = compute_signature(payload, channel_secret);
    let is_valid: bool = computed.as_bytes().ct_eq(signature.as_bytes()).into();

    if !is_valid {
        logfire::warn!("Webhook signature verification failed: signatures do not match");
    }

    is_valid
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"testsecret";
    const BODY: &[u8] = br#"{"events":[{"type":"message","message":{"type":"text","text":"hello"},"replyToken":"tok1"}]}"#;
    const SIGNATURE: &str = "k96Uypi7xWlEci8swK+0ICdNzLkONXlsSVK0mk84VQ4=";

    #[test]
    fn test_compute_signature_golden_vectors() {
        assert_eq!(compute_signature(BODY, SECRET), SIGNATURE);
        assert_eq!(
            compute_signature(br#"{"destination":"U1","events":[]}"#, b"channel-secret"),
            "B2fF7S6jgMOeNq3IokYsA4lKncYApSaoE3IcBIVdHr4="
        );
    }

    #[test]
    fn test_verify_signature_valid() {
        assert!(verify_signature(Some(SIGNATURE), BODY, SECRET));
    }

    #[test]
    fn test_verify_signature_missing_header() {
        assert!(!verify_signature(None, BODY, SECRET));
    }

    #[test]
    fn test_verify_signature_empty_body() {
        let empty_signature = compute_signature(b"", SECRET);
        assert!(!verify_signature(Some(&empty_signature), b"", SECRET));
    }

    #[test]
    fn test_verify_signature_single_bit_flip() {
        let mut digest = STANDARD.decode(SIGNATURE).unwrap();
        digest[0] ^= 0b0000_0001;
        let flipped = STANDARD.encode(digest);

        assert_ne!(flipped, SIGNATURE);
        assert!(!verify_signature(Some(&flipped), BODY, SECRET));
    }

    #[test]
    fn test_verify_signature_unconfigured_secret() {
        let signature = compute_signature(BODY, b"");
        assert!(!verify_signature(Some(&signature), BODY, b""));
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        assert!(!verify_signature(Some(SIGNATURE), BODY, b"wrong_secret"));
    }

    #[test]
    fn test_verify_signature_tampered_payload() {
        let tampered = br#"{"events":[{"type":"message","message":{"type":"text","text":"hacked"},"replyToken":"tok1"}]}"#;
        assert!(!verify_signature(Some(SIGNATURE), tampered, SECRET));
    }

    #[test]
    fn test_verify_signature_rejects_reserialized_json() {
        // same JSON document, different bytes
        let reformatted = serde_json::to_vec_pretty(
            &serde_json::from_slice::<serde_json::Value>(BODY).unwrap(),
        )
        .unwrap();
        assert!(!verify_signature(Some(SIGNATURE), &reformatted, SECRET));
    }

    #[test]
    fn test_verify_signature_rejects_hex_encoding() {
        let hex_signature: String = STANDARD
            .decode(SIGNATURE)
            .unwrap()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        assert!(!verify_signature(Some(&hex_signature), BODY, SECRET));
    }
}
