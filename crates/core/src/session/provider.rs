//! Auth provider contract and session change subscriptions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use debtbook_shared::Session;
use thiserror::Error;

/// Errors reported by an auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Email or password was not accepted.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The call did not complete in time.
    #[error("auth request timed out after {0:?}")]
    Timeout(Duration),

    /// Network-level failure.
    #[error("auth transport error: {0}")]
    Transport(String),

    /// The provider answered with an error status.
    #[error("auth request rejected with status {status}: {message}")]
    Rejected {
        /// HTTP-style status code.
        status: u16,
        /// Provider message.
        message: String,
    },

    /// The provider answered with a body that could not be decoded.
    #[error("unexpected auth response: {0}")]
    Decode(String),

    /// Local failure (hashing, token minting, session file).
    #[error("auth internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns true for failures that may go away on their own.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Transport(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::InvalidCredentials | Self::Decode(_) | Self::Internal(_) => false,
        }
    }
}

/// Callback invoked with the new session (`None` after sign-out or expiry).
pub type SessionListener = Arc<dyn Fn(Option<Session>) + Send + Sync>;

/// Issues and validates sessions.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the session restored from a previous run, if still valid.
    ///
    /// May contact the provider to refresh an expired access token.
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    /// Exchanges credentials for a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Ends the current session.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Registers a listener fired on sign-in, sign-out and expiry.
    ///
    /// The listener stays registered until the returned handle is dropped
    /// or unsubscribed.
    fn on_session_change(&self, listener: SessionListener) -> Subscription;
}

type ListenerMap = DashMap<u64, SessionListener>;

/// Registry of session listeners, shared by provider implementations.
#[derive(Default)]
pub struct SessionListeners {
    next_id: AtomicU64,
    listeners: Arc<ListenerMap>,
}

impl std::fmt::Debug for SessionListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionListeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

impl SessionListeners {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    pub fn subscribe(&self, listener: SessionListener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.insert(id, listener);
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Fires every registered listener with `session`.
    ///
    /// Listeners run after the registry is released, so they may
    /// subscribe or unsubscribe.
    pub fn notify(&self, session: Option<&Session>) {
        let listeners: Vec<SessionListener> = self
            .listeners
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        for listener in listeners {
            listener(session.cloned());
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Handle to a registered session listener.
///
/// Dropping the handle unsubscribes. Teardown happens exactly once.
#[must_use = "dropping a Subscription unsubscribes the listener"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    listeners: Weak<ListenerMap>,
}

impl Subscription {
    /// Removes the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Returns true while the listener is registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.listeners
            .upgrade()
            .is_some_and(|map| map.contains_key(&self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(map) = self.listeners.upgrade() {
            map.remove(&self.id);
        }
    }
}
