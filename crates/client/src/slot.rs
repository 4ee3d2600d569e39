//! Provider-side session state shared by the auth adapters.
//!
//! Holds the current session, fans changes out to listeners, mirrors the
//! session to an optional file and arms a timer that ends the session when
//! its access token expires.

use std::sync::{Arc, Weak};

use chrono::Utc;
use debtbook_core::session::{SessionListener, SessionListeners, Subscription};
use debtbook_shared::Session;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::session_file::SessionFile;

pub(crate) struct SessionSlot {
    current: Mutex<Option<Session>>,
    listeners: SessionListeners,
    file: Option<SessionFile>,
    expiry: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for SessionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSlot")
            .field("current", &*self.current.lock())
            .field("listeners", &self.listeners)
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

impl SessionSlot {
    pub(crate) fn new(file: Option<SessionFile>) -> Arc<Self> {
        Arc::new(Self {
            current: Mutex::new(None),
            listeners: SessionListeners::new(),
            file,
            expiry: Mutex::new(None),
        })
    }

    pub(crate) fn current(&self) -> Option<Session> {
        self.current.lock().clone()
    }

    /// Session persisted by a previous run, if any. Unreadable files are discarded.
    pub(crate) fn persisted(&self) -> Option<Session> {
        let file = self.file.as_ref()?;
        match file.load() {
            Ok(session) => session,
            Err(e) => {
                warn!(
                    path = %file.path().display(),
                    error = %e,
                    "Discarding unreadable session file"
                );
                if let Err(e) = file.remove() {
                    warn!(error = %e, "Failed to remove session file");
                }
                None
            }
        }
    }

    pub(crate) fn subscribe(&self, listener: SessionListener) -> Subscription {
        self.listeners.subscribe(listener)
    }

    /// Makes `session` current, persists it and notifies listeners.
    pub(crate) fn establish(self: &Arc<Self>, session: Session) {
        *self.current.lock() = Some(session.clone());

        if let Some(file) = &self.file
            && let Err(e) = file.save(&session)
        {
            warn!(path = %file.path().display(), error = %e, "Failed to persist session");
        }
        self.arm_expiry(&session);

        info!(owner = %session.owner, "Session started");
        self.listeners.notify(Some(&session));
    }

    /// Ends the current session, if any, and notifies listeners.
    pub(crate) fn clear(&self) {
        if let Some(timer) = self.expiry.lock().take() {
            timer.abort();
        }
        self.end();
    }

    fn end(&self) {
        let previous = self.current.lock().take();

        if let Some(file) = &self.file
            && let Err(e) = file.remove()
        {
            warn!(path = %file.path().display(), error = %e, "Failed to remove session file");
        }

        if let Some(previous) = previous {
            info!(owner = %previous.owner, "Session ended");
            self.listeners.notify(None);
        }
    }

    /// Called by the timer; ignored if the session was replaced meanwhile.
    fn expire(&self, access_token: &str) {
        let still_current = self
            .current
            .lock()
            .as_ref()
            .is_some_and(|s| s.access_token == access_token);
        if !still_current {
            return;
        }

        // The running timer is this task; detach instead of aborting it.
        drop(self.expiry.lock().take());
        warn!("Session expired");
        self.end();
    }

    fn arm_expiry(self: &Arc<Self>, session: &Session) {
        let previous = self.expiry.lock().take();
        if let Some(previous) = previous {
            previous.abort();
        }

        let Some(delay) = session.time_to_expiry(Utc::now()) else {
            return;
        };
        debug!(owner = %session.owner, ?delay, "Session expiry timer armed");

        let slot: Weak<Self> = Arc::downgrade(self);
        let token = session.access_token.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(slot) = slot.upgrade() {
                slot.expire(&token);
            }
        });
        *self.expiry.lock() = Some(timer);
    }
}

impl Drop for SessionSlot {
    fn drop(&mut self) {
        if let Some(timer) = self.expiry.get_mut().take() {
            timer.abort();
        }
    }
}
