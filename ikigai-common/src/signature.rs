//! Payment webhook signature verification
//!
//! Header format: `t=<unix seconds>,v1=<hex hmac>[,v1=<hex hmac>...]`.
//! The signed payload is `"{t}.{raw body}"`, HMAC-SHA256 keyed with the
//! webhook secret. Several `v1` entries may be present while a secret is
//! being rotated; any one matching is enough.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "x-ikigai-signature";

/// Default allowed clock difference between signer and verifier
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature header missing")]
    MissingHeader,

    #[error("malformed signature header: {0}")]
    MalformedHeader(String),

    #[error("signature timestamp {timestamp} outside tolerance of {tolerance_secs}s (now {now})")]
    TimestampOutOfTolerance {
        timestamp: i64,
        now: i64,
        tolerance_secs: i64,
    },

    #[error("signature mismatch")]
    Mismatch,

    #[error("invalid webhook secret")]
    InvalidSecret,
}

/// Parsed signature header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signatures: Vec<Vec<u8>>,
}

/// Parse a signature header value
///
/// Unknown keys are skipped so providers can add schemes without breaking us.
pub fn parse_header(value: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in value.split(',') {
        let (key, val) = part
            .trim()
            .split_once('=')
            .ok_or_else(|| SignatureError::MalformedHeader(format!("bad element '{}'", part)))?;

        match key {
            "t" => {
                let parsed = val.parse::<i64>().map_err(|e| {
                    SignatureError::MalformedHeader(format!("bad timestamp '{}': {}", val, e))
                })?;
                timestamp = Some(parsed);
            }
            "v1" => {
                let bytes = hex::decode(val).map_err(|e| {
                    SignatureError::MalformedHeader(format!("bad v1 signature: {}", e))
                })?;
                signatures.push(bytes);
            }
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| SignatureError::MalformedHeader("missing t".to_string()))?;
    if signatures.is_empty() {
        return Err(SignatureError::MalformedHeader("missing v1".to_string()));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn keyed_mac(secret: &[u8], timestamp: i64, body: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    Ok(mac)
}

/// Compute the hex signature for a payload
pub fn sign_payload(secret: &[u8], timestamp: i64, body: &[u8]) -> Result<String, SignatureError> {
    let mac = keyed_mac(secret, timestamp, body)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build a complete header value for a payload
pub fn signature_header(
    secret: &[u8],
    timestamp: i64,
    body: &[u8],
) -> Result<String, SignatureError> {
    Ok(format!("t={},v1={}", timestamp, sign_payload(secret, timestamp, body)?))
}

/// Verify a webhook delivery
///
/// Returns the signed timestamp on success. Comparison is constant-time.
pub fn verify_signature(
    header: Option<&str>,
    body: &[u8],
    secret: &[u8],
    now: i64,
    tolerance_secs: i64,
) -> Result<i64, SignatureError> {
    let header = parse_header(header.ok_or(SignatureError::MissingHeader)?)?;

    if (now - header.timestamp).abs() > tolerance_secs {
        return Err(SignatureError::TimestampOutOfTolerance {
            timestamp: header.timestamp,
            now,
            tolerance_secs,
        });
    }

    let mac = keyed_mac(secret, header.timestamp, body)?;
    let matched = header
        .signatures
        .iter()
        .any(|candidate| mac.clone().verify_slice(candidate).is_ok());

    if matched {
        Ok(header.timestamp)
    } else {
        Err(SignatureError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"whsec_test_secret";
    const NOW: i64 = 1_730_000_000;
    const BODY: &[u8] = br#"{"eventId":"evt_1","type":"payment.completed"}"#;

    #[test]
    fn test_valid_signature_accepted() {
        let header = signature_header(SECRET, NOW, BODY).unwrap();
        let result = verify_signature(Some(&header), BODY, SECRET, NOW, DEFAULT_TOLERANCE_SECS);
        assert_eq!(result, Ok(NOW));
    }

    #[test]
    fn test_signature_is_64_hex_chars() {
        let sig = sign_payload(SECRET, NOW, BODY).unwrap();
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tampered_body_rejected() {
        let header = signature_header(SECRET, NOW, BODY).unwrap();
        let tampered = br#"{"eventId":"evt_1","type":"payment.completed","x":1}"#;
        let result = verify_signature(Some(&header), tampered, SECRET, NOW, DEFAULT_TOLERANCE_SECS);
        assert_eq!(result, Err(SignatureError::Mismatch));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let header = signature_header(b"other", NOW, BODY).unwrap();
        let result = verify_signature(Some(&header), BODY, SECRET, NOW, DEFAULT_TOLERANCE_SECS);
        assert_eq!(result, Err(SignatureError::Mismatch));
    }

    #[test]
    fn test_stale_and_future_timestamps_rejected() {
        let old = signature_header(SECRET, NOW - 301, BODY).unwrap();
        assert!(matches!(
            verify_signature(Some(&old), BODY, SECRET, NOW, DEFAULT_TOLERANCE_SECS),
            Err(SignatureError::TimestampOutOfTolerance { .. })
        ));

        let future = signature_header(SECRET, NOW + 301, BODY).unwrap();
        assert!(matches!(
            verify_signature(Some(&future), BODY, SECRET, NOW, DEFAULT_TOLERANCE_SECS),
            Err(SignatureError::TimestampOutOfTolerance { .. })
        ));

        let edge = signature_header(SECRET, NOW - 300, BODY).unwrap();
        assert!(verify_signature(Some(&edge), BODY, SECRET, NOW, DEFAULT_TOLERANCE_SECS).is_ok());
    }

    #[test]
    fn test_missing_header_rejected() {
        assert_eq!(
            verify_signature(None, BODY, SECRET, NOW, DEFAULT_TOLERANCE_SECS),
            Err(SignatureError::MissingHeader)
        );
    }

    #[test]
    fn test_malformed_headers_rejected() {
        for header in ["", "garbage", "t=abc,v1=00", "t=1", "v1=00", "t=1,v1=zz"] {
            assert!(
                matches!(parse_header(header), Err(SignatureError::MalformedHeader(_))),
                "header '{}' should be malformed",
                header
            );
        }
    }

    #[test]
    fn test_any_matching_v1_accepted() {
        let good = sign_payload(SECRET, NOW, BODY).unwrap();
        let header = format!("t={},v1={},v1={}", NOW, "00".repeat(32), good);
        assert!(verify_signature(Some(&header), BODY, SECRET, NOW, DEFAULT_TOLERANCE_SECS).is_ok());
    }

    #[test]
    fn test_unknown_scheme_ignored() {
        let good = sign_payload(SECRET, NOW, BODY).unwrap();
        let header = format!("t={},v0=deadbeef,v1={}", NOW, good);
        assert!(verify_signature(Some(&header), BODY, SECRET, NOW, DEFAULT_TOLERANCE_SECS).is_ok());
    }
}
