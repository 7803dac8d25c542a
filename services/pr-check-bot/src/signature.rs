//! Webhook Signature Verification
//!
//! GitHub signs each delivery with HMAC-SHA256 over the raw request body and
//! sends the result as `X-Hub-Signature-256: sha256=<hex>`. Verification must
//! run on the exact bytes received, before the body is parsed.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::PipelineError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Shared webhook secret configured on the GitHub App
#[derive(Clone)]
pub struct WebhookSecret(Vec<u8>);

impl WebhookSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(<redacted>)")
    }
}

/// Computes the raw HMAC-SHA256 of a payload.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a signature the way GitHub sends it: `sha256=<lowercase hex>`.
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(signature))
}

/// Gate in front of event parsing
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    secret: WebhookSecret,
}

impl SignatureVerifier {
    pub fn new(secret: WebhookSecret) -> Self {
        Self { secret }
    }

    /// Check `header` against the signature of `body`.
    ///
    /// The comparison is constant-time in the content of both values. Only
    /// the header length can short-circuit it, and that is public.
    pub fn verify(&self, body: &[u8], header: Option<&[u8]>) -> Result<(), PipelineError> {
        let header = header.ok_or(PipelineError::MissingSignature)?;

        let expected =
            format_signature_header(&compute_signature(body, self.secret.expose()));

        if bool::from(expected.as_bytes().ct_eq(header)) {
            Ok(())
        } else {
            Err(PipelineError::InvalidSignature)
        }
    }
}
