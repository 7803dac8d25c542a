//! GitHub App Authentication
//!
//! Mints the RS256 JWT a GitHub App presents when asking for an installation
//! token. A fresh JWT is issued for every exchange and never stored.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Lifetime of an app JWT; GitHub rejects anything longer than ten minutes
pub const ASSERTION_TTL_SECS: i64 = 600;

/// JWT claims for GitHub App authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubAppClaims {
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer (GitHub App ID)
    pub iss: String,
}

/// Signed app JWT, valid for one exchange
pub struct Assertion {
    jwt: String,
    issued_at: i64,
    expires_at: i64,
}

impl Assertion {
    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Encoded JWT, for the `Authorization` header only
    pub(crate) fn bearer(&self) -> &str {
        &self.jwt
    }
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assertion")
            .field("jwt", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Signs app JWTs with the App's private key
///
/// The key is parsed once at construction and never leaves this struct.
pub struct AssertionIssuer {
    app_id: String,
    key: EncodingKey,
}

impl AssertionIssuer {
    /// Build an issuer from the App ID and its RSA private key in PEM format
    pub fn new(app_id: impl Into<String>, private_key_pem: &[u8]) -> Result<Self, PipelineError> {
        let key = EncodingKey::from_rsa_pem(private_key_pem).map_err(PipelineError::SigningKey)?;
        Ok(Self {
            app_id: app_id.into(),
            key,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Issue a JWT valid from now for ten minutes
    pub fn issue(&self) -> Result<Assertion, PipelineError> {
        self.issue_at(Utc::now().timestamp())
    }

    /// Issue a JWT with `iat = now` and `exp = now + 600`
    pub fn issue_at(&self, now: i64) -> Result<Assertion, PipelineError> {
        let claims = GitHubAppClaims {
            iat: now,
            exp: now + ASSERTION_TTL_SECS,
            iss: self.app_id.clone(),
        };

        let header = Header::new(Algorithm::RS256);
        let jwt = encode(&header, &claims, &self.key).map_err(PipelineError::SigningKey)?;

        Ok(Assertion {
            jwt,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

impl std::fmt::Debug for AssertionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssertionIssuer")
            .field("app_id", &self.app_id)
            .field("key", &"<redacted>")
            .finish()
    }
}
