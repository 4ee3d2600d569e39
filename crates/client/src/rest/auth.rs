//! Auth provider backed by a GoTrue-style auth API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use debtbook_core::session::{AuthError, AuthProvider, SessionListener, Subscription};
use debtbook_shared::auth::{RefreshRequest, TokenResponse};
use debtbook_shared::config::StoreConfig;
use debtbook_shared::{Credentials, Session};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{API_KEY_HEADER, endpoint, error_message, http_client};
use crate::session_file::SessionFile;
use crate::slot::SessionSlot;

/// Auth provider talking to `{url}/auth/v1`.
///
/// The session is mirrored to an optional [`SessionFile`] so later runs can
/// restore it, and ends on its own when the access token expires.
#[derive(Debug)]
pub struct RestAuthProvider {
    http: Client,
    auth_url: String,
    anon_key: String,
    timeout: Duration,
    slot: Arc<SessionSlot>,
}

impl RestAuthProvider {
    /// Creates a provider for the configured project.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &StoreConfig, session_file: Option<SessionFile>) -> Result<Self, AuthError> {
        let timeout = config.request_timeout();
        let http = http_client(timeout).map_err(|e| AuthError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            auth_url: endpoint(&config.url, "auth/v1"),
            anon_key: config.anon_key.clone(),
            timeout,
            slot: SessionSlot::new(session_file),
        })
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let url = format!("{}/{path}", self.auth_url);
        debug!(%url, "Auth request");
        self.http.post(url).header(API_KEY_HEADER, &self.anon_key)
    }

    async fn token_grant<B: Serialize + ?Sized>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<Session, AuthError> {
        let request = self
            .post("token")
            .query(&[("grant_type", grant_type)])
            .json(body);
        let response = self.send(request).await?;

        let body = response.text().await.map_err(|e| self.transport(&e))?;
        let tokens: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::Decode(e.to_string()))?;
        Ok(tokens.into_session(Utc::now()))
    }

    /// Exchanges a refresh token for a new session.
    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.token_grant("refresh_token", &body).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AuthError> {
        let response = request.send().await.map_err(|e| self.transport(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AuthError::Rejected {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    fn transport(&self, err: &reqwest::Error) -> AuthError {
        if err.is_timeout() {
            AuthError::Timeout(self.timeout)
        } else {
            AuthError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl AuthProvider for RestAuthProvider {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        if let Some(session) = self.slot.current().filter(|s| !s.is_expired()) {
            return Ok(Some(session));
        }

        // An expired in-memory session is refreshed or dropped like a stored one.
        let Some(stored) = self.slot.persisted().or_else(|| self.slot.current()) else {
            return Ok(None);
        };
        if !stored.is_expired() {
            self.slot.establish(stored.clone());
            return Ok(Some(stored));
        }

        let Some(refresh_token) = stored.refresh_token.as_deref() else {
            info!(owner = %stored.owner, "Stored session expired, discarding");
            self.slot.clear();
            return Ok(None);
        };

        match self.refresh(refresh_token).await {
            Ok(session) => {
                info!(owner = %session.owner, "Stored session refreshed");
                self.slot.establish(session.clone());
                Ok(Some(session))
            }
            Err(e) if e.is_transient() => {
                warn!(error = %e, "Session refresh failed, keeping stored session");
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "Session refresh rejected, discarding stored session");
                self.slot.clear();
                Ok(None)
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let session = match self.token_grant("password", &credentials).await {
            Ok(session) => session,
            Err(AuthError::Rejected { status, message })
                if status == StatusCode::BAD_REQUEST.as_u16()
                    || status == StatusCode::UNAUTHORIZED.as_u16() =>
            {
                debug!(%message, "Sign-in rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        self.slot.establish(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.slot.current() else {
            self.slot.clear();
            return Ok(());
        };

        let request = self.post("logout").bearer_auth(&session.access_token);
        let result = match self.send(request).await {
            Ok(_) => Ok(()),
            // The token is already unusable server-side.
            Err(AuthError::Rejected { status, .. })
                if matches!(status, 401 | 403 | 404) =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        };

        self.slot.clear();
        result
    }

    fn on_session_change(&self, listener: SessionListener) -> Subscription {
        self.slot.subscribe(listener)
    }
}
