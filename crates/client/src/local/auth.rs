//! Auth provider with an in-process credential table.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use debtbook_core::session::{AuthError, AuthProvider, SessionListener, Subscription};
use debtbook_shared::types::UserId;
use debtbook_shared::{Session, SessionTokenService, TokenConfig, TokenError};
use tracing::{debug, info};

use super::password::{hash_password, verify_password};
use crate::session_file::SessionFile;
use crate::slot::SessionSlot;

#[derive(Debug, Clone)]
struct LocalUser {
    id: UserId,
    email: String,
    password_hash: String,
}

/// Auth provider that keeps Argon2id credential hashes in memory and issues
/// HS256 session tokens.
///
/// Pairs with `MemoryLedgerStore` for offline use and tests.
#[derive(Debug)]
pub struct LocalAuthProvider {
    users: DashMap<String, LocalUser>,
    tokens: SessionTokenService,
    slot: Arc<SessionSlot>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl LocalAuthProvider {
    /// Creates a provider with no registered users.
    #[must_use]
    pub fn new(config: TokenConfig) -> Self {
        Self::with_session_file(config, None)
    }

    /// Creates a provider that mirrors its session to `session_file`.
    #[must_use]
    pub fn with_session_file(config: TokenConfig, session_file: Option<SessionFile>) -> Self {
        Self {
            users: DashMap::new(),
            tokens: SessionTokenService::new(config),
            slot: SessionSlot::new(session_file),
        }
    }

    /// Registers a user and returns its owner ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` with status 422 if the email is blank or
    /// already registered.
    pub fn register(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AuthError::Rejected {
                status: 422,
                message: "email is required".to_string(),
            });
        }

        match self.users.entry(email.clone()) {
            MapEntry::Occupied(_) => Err(AuthError::Rejected {
                status: 422,
                message: "user already registered".to_string(),
            }),
            MapEntry::Vacant(slot) => {
                let user = LocalUser {
                    id: UserId::new(),
                    email,
                    password_hash: hash_password(password)?,
                };
                let id = user.id;
                info!(owner = %id, "Local user registered");
                slot.insert(user);
                Ok(id)
            }
        }
    }

    /// Revokes the current session, notifying listeners as an expiry would.
    pub fn revoke_current(&self) {
        self.slot.clear();
    }

    fn token_is_valid(&self, session: &Session) -> bool {
        match self.tokens.validate(&session.access_token) {
            Ok(claims) => claims.sub == session.owner,
            Err(TokenError::Expired) => false,
            Err(e) => {
                debug!(error = %e, "Stored token rejected");
                false
            }
        }
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        if let Some(session) = self.slot.current() {
            if self.token_is_valid(&session) {
                return Ok(Some(session));
            }
            self.slot.clear();
        }

        match self.slot.persisted() {
            Some(stored) if self.token_is_valid(&stored) => {
                self.slot.establish(stored.clone());
                Ok(Some(stored))
            }
            Some(_) => {
                self.slot.clear();
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let Some(user) = self.users.get(&normalize_email(email)).map(|u| u.value().clone()) else {
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let session = self
            .tokens
            .issue(user.id, &user.email, Utc::now())
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        self.slot.establish(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.slot.clear();
        Ok(())
    }

    fn on_session_change(&self, listener: SessionListener) -> Subscription {
        self.slot.subscribe(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn provider(ttl: i64) -> LocalAuthProvider {
        LocalAuthProvider::new(TokenConfig {
            secret: "local-test-secret".to_string(),
            session_ttl_secs: ttl,
        })
    }

    #[tokio::test]
    async fn test_register_and_sign_in() {
        let auth = provider(3600);
        let owner = auth.register("Anna@Example.com ", "hunter2").unwrap();

        let session = auth.sign_in("anna@example.com", "hunter2").await.unwrap();
        assert_eq!(session.owner, owner);
        assert_eq!(session.email.as_deref(), Some("anna@example.com"));
        assert!(session.expires_at.is_some());
        assert_eq!(auth.current_session().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user() {
        let auth = provider(3600);
        auth.register("anna@example.com", "hunter2").unwrap();

        assert_eq!(
            auth.sign_in("anna@example.com", "nope").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            auth.sign_in("ben@example.com", "hunter2").await,
            Err(AuthError::InvalidCredentials)
        );
        assert!(auth.current_session().await.unwrap().is_none());
    }

    #[test]
    fn test_duplicate_registration() {
        let auth = provider(3600);
        auth.register("anna@example.com", "a").unwrap();

        assert!(matches!(
            auth.register("ANNA@example.com", "b"),
            Err(AuthError::Rejected { status: 422, .. })
        ));
        assert!(matches!(
            auth.register("  ", "b"),
            Err(AuthError::Rejected { status: 422, .. })
        ));
    }

    #[tokio::test]
    async fn test_revoke_notifies_listeners() {
        let auth = provider(3600);
        auth.register("anna@example.com", "hunter2").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = auth.on_session_change(Arc::new(move |s: Option<Session>| {
            sink.lock().push(s.is_some());
        }));

        auth.sign_in("anna@example.com", "hunter2").await.unwrap();
        auth.revoke_current();

        assert_eq!(*seen.lock(), vec![true, false]);
        assert!(auth.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_restored_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let config = TokenConfig {
            secret: "local-test-secret".to_string(),
            session_ttl_secs: 3600,
        };

        let first =
            LocalAuthProvider::with_session_file(config.clone(), Some(SessionFile::new(&path)));
        first.register("anna@example.com", "hunter2").unwrap();
        let session = first.sign_in("anna@example.com", "hunter2").await.unwrap();

        let second = LocalAuthProvider::with_session_file(config, Some(SessionFile::new(&path)));
        assert_eq!(second.current_session().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_forged_stored_session_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));
        file.save(&Session {
            owner: UserId::new(),
            email: None,
            access_token: "forged".to_string(),
            refresh_token: None,
            expires_at: None,
        })
        .unwrap();

        let auth = LocalAuthProvider::with_session_file(TokenConfig::default(), Some(file.clone()));
        assert!(auth.current_session().await.unwrap().is_none());
        assert!(file.load().unwrap().is_none());
    }
}
