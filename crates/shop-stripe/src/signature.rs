//! # Webhook Signature Verification
//!
//! Stripe signs each delivery with `Stripe-Signature: t=<unix>,v1=<hex>[,v1=<hex>...]`.
//! The expected signature is the hex HMAC-SHA256 of `"{t}." ++ body` keyed by
//! the endpoint's signing secret.
//!
//! Verification yields a [`VerifiedPayload`]; event parsing only accepts that
//! type, so an unverified body can never reach the JSON parser.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use shop_core::ShopError;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted skew between the signature timestamp and now, either
/// direction. A skew of exactly this many seconds is accepted.
pub const TOLERANCE_SECS: i64 = 300;

/// Why a signature was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Missing timestamp in signature header")]
    MissingTimestamp,

    #[error("Invalid timestamp in signature header: {0}")]
    InvalidTimestamp(String),

    #[error("No v1 signature found")]
    MissingSignature,

    #[error("Timestamp outside tolerance ({skew_secs}s)")]
    OutsideTolerance { skew_secs: i64 },

    #[error("Signature mismatch")]
    Mismatch,
}

impl From<SignatureError> for ShopError {
    fn from(err: SignatureError) -> Self {
        ShopError::Authentication(err.to_string())
    }
}

/// Parsed `Stripe-Signature` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signatures: Vec<String>,
}

impl SignatureHeader {
    /// Parse `t=<unix>,v1=<hex>[,v1=<hex>...]`.
    ///
    /// Pairs without `=` or with an empty side are skipped, as are unknown
    /// keys such as `v0`.
    pub fn parse(header: &str) -> Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',').map(str::trim) {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                continue;
            }
            match key {
                "t" => timestamp = Some(value),
                "v1" => signatures.push(value.to_string()),
                _ => {}
            }
        }

        let raw = timestamp.ok_or(SignatureError::MissingTimestamp)?;
        let timestamp = raw
            .parse::<i64>()
            .map_err(|_| SignatureError::InvalidTimestamp(raw.to_string()))?;

        if signatures.is_empty() {
            return Err(SignatureError::MissingSignature);
        }

        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

/// A webhook body whose signature has been checked
#[derive(Debug, Clone, Copy)]
pub struct VerifiedPayload<'a> {
    body: &'a [u8],
    timestamp: i64,
}

impl<'a> VerifiedPayload<'a> {
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// Timestamp the provider signed
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// Compute the hex signature Stripe would send for `body` at `timestamp`.
pub fn compute_signature(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify against an explicit clock (unix seconds).
pub fn verify_payload_at<'a>(
    body: &'a [u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<VerifiedPayload<'a>, SignatureError> {
    let parsed = SignatureHeader::parse(header)?;

    let skew_secs = now.saturating_sub(parsed.timestamp);
    if skew_secs.saturating_abs() > TOLERANCE_SECS {
        return Err(SignatureError::OutsideTolerance { skew_secs });
    }

    let expected = compute_signature(secret, parsed.timestamp, body);

    let matched = parsed
        .signatures
        .iter()
        .fold(false, |found, candidate| found | constant_time_eq(candidate, &expected));

    if !matched {
        return Err(SignatureError::Mismatch);
    }

    Ok(VerifiedPayload {
        body,
        timestamp: parsed.timestamp,
    })
}

/// Verify against the system clock.
pub fn verify_payload<'a>(
    body: &'a [u8],
    header: &str,
    secret: &str,
) -> Result<VerifiedPayload<'a>, SignatureError> {
    verify_payload_at(body, header, secret, Utc::now().timestamp())
}

/// Boolean form: true only for an authentic, fresh delivery.
pub fn verify(body: &[u8], header: &str, secret: &str) -> bool {
    verify_payload(body, header, secret).is_ok()
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
