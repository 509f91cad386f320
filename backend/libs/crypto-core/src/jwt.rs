//! Signed token issuance and validation for the blog services
//!
//! Tokens are HS256 JWTs signed with a shared secret. Two kinds exist:
//!
//! - **Session** tokens authenticate API requests (`Authorization: Bearer ...`)
//! - **EmailVerification** tokens are embedded in verification links
//!
//! The kind is carried in the `token_type` claim and checked on validation, so a
//! verification link can never be replayed as a session credential.
//!
//! ## Usage
//!
//! ```rust
//! use crypto_core::jwt::{JwtManager, TokenKind};
//! use chrono::Duration;
//! use uuid::Uuid;
//!
//! let manager = JwtManager::from_secret(
//!     "a-very-long-secret-with-at-least-32-bytes",
//!     Duration::days(7),
//!     Duration::hours(24),
//! )
//! .unwrap();
//!
//! let token = manager.issue(TokenKind::Session, Uuid::new_v4(), "alice@x.com").unwrap();
//! let claims = manager.validate(&token, TokenKind::Session).unwrap();
//! assert_eq!(claims.email, "alice@x.com");
//! ```

use anyhow::{anyhow, bail, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Minimum secret length accepted for HS256 signing
pub const MIN_SECRET_BYTES: usize = 32;

// ============================================================================
// Data Structures
// ============================================================================

/// Purpose a token was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Session,
    EmailVerification,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Session => "session",
            TokenKind::EmailVerification => "email_verification",
        }
    }
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID as UUID string)
    pub sub: String,
    /// Email address at issuance time
    pub email: String,
    /// "session" or "email_verification"
    pub token_type: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Parse the subject back into an account id
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("Invalid user ID format in token: {e}"))
    }
}

// ============================================================================
// Manager
// ============================================================================

/// Holds the signing keys and token lifetimes.
///
/// Built once at startup and shared behind an `Arc`.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_ttl: Duration,
    verification_ttl: Duration,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("session_ttl", &self.session_ttl)
            .field("verification_ttl", &self.verification_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Build a manager from a shared secret
    ///
    /// ## Errors
    ///
    /// Returns error if the secret is shorter than [`MIN_SECRET_BYTES`].
    pub fn from_secret(
        secret: &str,
        session_ttl: Duration,
        verification_ttl: Duration,
    ) -> Result<Self> {
        if secret.len() < MIN_SECRET_BYTES {
            bail!("JWT secret must be at least {MIN_SECRET_BYTES} bytes");
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_ttl,
            verification_ttl,
        })
    }

    /// Lifetime applied to tokens of the given kind
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Session => self.session_ttl,
            TokenKind::EmailVerification => self.verification_ttl,
        }
    }

    /// Issue a signed token for an account
    pub fn issue(&self, kind: TokenKind, user_id: Uuid, email: &str) -> Result<String> {
        let now = Utc::now();
        let expiry = now + self.ttl(kind);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            token_type: kind.as_str().to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| anyhow!("Failed to generate {} token: {e}", kind.as_str()))
    }

    /// Validate signature, expiry and kind of a token
    ///
    /// ## Errors
    ///
    /// Returns error if:
    /// - Token signature is invalid or the token is malformed
    /// - Token is expired
    /// - Token was issued for a different purpose
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow!("Token validation failed: {e}"))?;

        if data.claims.token_type != expected.as_str() {
            bail!(
                "Token type mismatch: expected {}, got {}",
                expected.as_str(),
                data.claims.token_type
            );
        }

        Ok(data.claims)
    }
}
