//! Authentication types: the active session and auth API payloads.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// An authenticated session bound to one owner.
///
/// Tokens are hidden from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The user every ledger entry of this session belongs to.
    pub owner: UserId,
    /// Email address the session was issued for, if known.
    #[serde(default)]
    pub email: Option<String>,
    /// Bearer token presented to the ledger store.
    pub access_token: String,
    /// Token used to obtain a fresh access token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("owner", &self.owner)
            .field("email", &self.email)
            .field("access_token", &"[hidden]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[hidden]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Session {
    /// Returns true if the session has expired at `now`.
    ///
    /// Sessions without an expiry never expire.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Returns true if the session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns the time left before expiry, or `None` for sessions that never expire.
    ///
    /// Already-expired sessions report a zero duration.
    #[must_use]
    pub fn time_to_expiry(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        self.expires_at.map(|at| {
            (at - now)
                .max(Duration::zero())
                .to_std()
                .unwrap_or_default()
        })
    }
}

/// Email/password credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[hidden]")
            .finish()
    }
}

/// Refresh token grant payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token.
    pub refresh_token: String,
}

/// Token response returned by the auth API for password and refresh grants.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Absolute expiry as a Unix timestamp.
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// The authenticated user.
    pub user: AuthUser,
}

/// User object embedded in auth responses.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    /// User ID.
    pub id: UserId,
    /// User email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Error body returned by the auth API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthErrorBody {
    /// Short error identifier.
    #[serde(default, alias = "error_code")]
    pub error: Option<String>,
    /// Human-readable description.
    #[serde(default, alias = "msg", alias = "message")]
    pub error_description: Option<String>,
}

impl AuthErrorBody {
    /// Returns the most descriptive message present.
    #[must_use]
    pub fn message(&self) -> String {
        self.error_description
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

impl TokenResponse {
    /// Converts the response into a session.
    ///
    /// `expires_at` wins over `expires_in` when both are present.
    #[must_use]
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));

        Session {
            owner: self.user.id,
            email: self.user.email,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}
