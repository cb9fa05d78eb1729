//! JWT Token Handler
//! Issues and verifies the signed, one-hour access tokens

use crate::auth::models::{Claims, Identity};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::debug;

/// Lifetime of every issued token.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Why a token could not be issued or accepted.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token has expired")]
    Expired,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            _ => TokenError::Malformed,
        }
    }
}

/// JWT Handler for token operations
///
/// Holds the process-wide signing key. The handler is immutable after
/// construction, so one instance is shared behind an `Arc` by every request.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for `identity`, valid for one hour from now.
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    /// Issue a token as if it had been created at `issued_at` (unix seconds).
    pub fn issue_at(&self, identity: &Identity, issued_at: i64) -> Result<String, TokenError> {
        let claims = Claims {
            user: identity.clone(),
            iat: issued_at,
            exp: issued_at + TOKEN_TTL_SECS,
        };

        debug!(
            user_id = identity.id,
            username = %identity.username,
            role = %identity.role,
            "Issuing access token"
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let decoded = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(decoded.claims)
    }
}
