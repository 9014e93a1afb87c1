//! Bearer token service.
//!
//! Tokens are HS256-signed JWTs carrying the principal id and an expiry.
//! Verification is stateless: there is no revocation list, expiry is the
//! only way a token stops working.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// JWT issuer claim value.
const ISSUER: &str = "orderly";

/// Token verification failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature mismatch, malformed structure or foreign issuer.
    #[error("invalid token")]
    Invalid,

    #[error("token has expired")]
    Expired,
}

/// JWT token claims.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenClaims {
    /// Issuer.
    pub iss: String,
    /// Subject (principal id).
    pub sub: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// JWT ID, unique per issuance.
    pub jti: String,
}

/// The authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    /// Unix timestamp after which the token is no longer accepted.
    pub expires_at: i64,
}

/// Issues and verifies bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    default_ttl: i64,
}

impl TokenService {
    /// Create a token service signing with HMAC-SHA256.
    pub fn new(secret: &[u8], default_ttl: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            default_ttl,
        }
    }

    /// Lifetime applied by [`issue_default`](Self::issue_default), in seconds.
    pub fn default_ttl(&self) -> i64 {
        self.default_ttl
    }

    /// Issue a token for `principal_id` with the configured lifetime.
    pub fn issue_default(&self, principal_id: &str) -> anyhow::Result<String> {
        self.issue(principal_id, self.default_ttl)
    }

    /// Issue a token valid for `ttl` seconds from now.
    pub fn issue(&self, principal_id: &str, ttl: i64) -> anyhow::Result<String> {
        self.issue_at(principal_id, ttl, chrono::Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, principal_id: &str, ttl: i64, now: i64) -> anyhow::Result<String> {
        let claims = TokenClaims {
            iss: ISSUER.to_string(),
            sub: principal_id.to_string(),
            iat: now,
            exp: now + ttl,
            jti: Uuid::now_v7().to_string(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("failed to encode token: {e}"))?;

        debug!(principal = %principal_id, exp = claims.exp, "token issued");
        Ok(token)
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify a token as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Principal, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against `now` without leeway.
        validation.validate_exp = false;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                TokenError::Invalid
            })?;

        if now >= data.claims.exp {
            debug!(principal = %data.claims.sub, "token expired");
            return Err(TokenError::Expired);
        }

        Ok(Principal {
            id: data.claims.sub,
            expires_at: data.claims.exp,
        })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
