//! Session token issuing and validation for locally managed sessions.
//!
//! Remote sessions carry tokens minted by the auth API; the local auth
//! provider mints its own with this service.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::Session;
use crate::types::UserId;

/// Claims carried by a locally issued session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (owner ID).
    pub sub: UserId,
    /// Email the token was issued for.
    pub email: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

/// Token configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Session lifetime in seconds.
    pub session_ttl_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            session_ttl_secs: 3600,
        }
    }
}

/// Errors that can occur during token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    Encoding(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    Decoding(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,
}

/// Issues and validates HS256 session tokens.
#[derive(Clone)]
pub struct SessionTokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for SessionTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenService")
            .field("session_ttl_secs", &self.config.session_ttl_secs)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl SessionTokenService {
    /// Creates a new token service with the given configuration.
    #[must_use]
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issues a session for `owner`, valid for the configured lifetime from `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if token generation fails.
    pub fn issue(
        &self,
        owner: UserId,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, TokenError> {
        let expires_at = now + Duration::seconds(self.config.session_ttl_secs);
        let claims = TokenClaims {
            sub: owner,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(Session {
            owner,
            email: Some(email.to_string()),
            access_token,
            refresh_token: None,
            expires_at: DateTime::from_timestamp(claims.exp, 0),
        })
    }

    /// Validates and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` if the token has expired.
    /// Returns `TokenError::Decoding` if the token is malformed or forged.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Decoding(e.to_string()),
            })
    }
}
