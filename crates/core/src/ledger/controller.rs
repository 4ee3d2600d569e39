//! Ledger controller: the entries of the signed-in owner and the
//! operations that change them.
//!
//! Every mutation either persists remotely and then updates local state, or
//! leaves local state exactly as it was. State is shared with the session
//! listener behind a mutex that is never held across an `.await`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use debtbook_shared::types::EntryId;
use debtbook_shared::{AppConfig, Session};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::balance::{self, Totals};
use super::entry::{Direction, Entry, NewEntry};
use super::error::{LedgerError, StoreError, ValidationError};
use super::reconcile::{Mutation, ReconcilePolicy};
use super::store::LedgerStore;
use super::validation::{validate_counterparty, validate_payment, validate_principal};
use crate::session::{
    AuthError, AuthProvider, SessionGate, SessionListener, Subscription, Transition,
};

/// Default upper bound for a single remote call.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Controller tuning.
#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    /// How local state follows confirmed writes.
    pub reconcile: ReconcilePolicy,
    /// Upper bound for each store and auth call.
    pub request_timeout: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            reconcile: ReconcilePolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ControllerSettings {
    /// Builds settings from application configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            reconcile: config.ledger.reconcile,
            request_timeout: config.store.request_timeout(),
        }
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    gate: SessionGate,
    entries: Vec<Entry>,
}

impl LedgerState {
    fn apply_session(&mut self, next: Option<Session>) -> Transition {
        let transition = self.gate.apply(next);
        if transition.clears_entries() {
            self.entries.clear();
        }
        transition
    }
}

/// Feeds session changes into a controller's gate.
///
/// Cloneable and cheap; this is what gets registered with an auth provider.
#[derive(Clone)]
pub struct SessionHandle {
    state: Arc<Mutex<LedgerState>>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle").finish_non_exhaustive()
    }
}

impl SessionHandle {
    /// Applies a session change. Leaving a session clears local entries.
    pub fn apply(&self, next: Option<Session>) -> Transition {
        let owner = next.as_ref().map(|s| s.owner);
        let transition = self.state.lock().apply_session(next);

        match (transition, owner) {
            (Transition::SignedIn | Transition::SwitchedOwner, Some(owner)) => {
                info!(owner = %owner, ?transition, "Session established");
            }
            (Transition::SignedOut, _) => info!("Session ended, local entries cleared"),
            (Transition::Refreshed, Some(owner)) => debug!(owner = %owner, "Session refreshed"),
            _ => {}
        }
        transition
    }

    /// Wraps the handle as an auth provider listener.
    #[must_use]
    pub fn listener(&self) -> SessionListener {
        let handle = self.clone();
        Arc::new(move |session| {
            handle.apply(session);
        })
    }
}

/// Session and generation captured before a remote call.
struct Scope {
    session: Session,
    generation: u64,
}

/// In-memory ledger of one authenticated owner.
pub struct LedgerController {
    store: Arc<dyn LedgerStore>,
    state: Arc<Mutex<LedgerState>>,
    settings: ControllerSettings,
}

impl std::fmt::Debug for LedgerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerController")
            .field("settings", &self.settings)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl LedgerController {
    /// Creates an anonymous controller over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, settings: ControllerSettings) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(LedgerState::default())),
            settings,
        }
    }

    /// Returns the handle through which session changes reach this controller.
    #[must_use]
    pub fn session_handle(&self) -> SessionHandle {
        SessionHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Subscribes this controller to `provider`'s session notifications.
    ///
    /// Expiry or revocation reported by the provider clears local entries
    /// immediately. Drop the returned handle to stop listening.
    pub fn bind(&self, provider: &dyn AuthProvider) -> Subscription {
        provider.on_session_change(self.session_handle().listener())
    }

    // ========== Session ==========

    /// Restores a previously valid session and loads its entries.
    ///
    /// If loading fails the session stays established with no entries.
    pub async fn restore(
        &self,
        provider: &dyn AuthProvider,
    ) -> Result<Option<Session>, LedgerError> {
        let session = self
            .bounded_auth(provider.current_session())
            .await?
            .filter(|s| !s.is_expired());

        self.session_handle().apply(session.clone());
        if session.is_some() {
            self.load().await?;
        }
        Ok(session)
    }

    /// Signs in and loads the owner's entries.
    ///
    /// Rejected credentials leave the gate untouched. If loading fails the
    /// session stays established with no entries.
    pub async fn sign_in(
        &self,
        provider: &dyn AuthProvider,
        email: &str,
        password: &str,
    ) -> Result<Session, LedgerError> {
        let session = self.bounded_auth(provider.sign_in(email, password)).await?;
        self.session_handle().apply(Some(session.clone()));
        self.load().await?;
        Ok(session)
    }

    /// Signs out. Local state is cleared even if the provider call fails.
    pub async fn sign_out(&self, provider: &dyn AuthProvider) -> Result<(), LedgerError> {
        let result = self.bounded_auth(provider.sign_out()).await;
        self.session_handle().apply(None);
        result
    }

    // ========== Snapshot ==========

    /// The active session.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.state.lock().gate.session().cloned()
    }

    /// Returns true while a session is active.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.lock().gate.is_authenticated()
    }

    /// Loaded entries, newest first.
    #[must_use]
    pub fn entries(&self) -> Vec<Entry> {
        self.state.lock().entries.clone()
    }

    /// A loaded entry by ID.
    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<Entry> {
        self.state.lock().entries.iter().find(|e| e.id == id).cloned()
    }

    /// Outstanding totals over the loaded entries.
    #[must_use]
    pub fn totals(&self) -> Totals {
        balance::totals(&self.state.lock().entries)
    }

    // ========== Operations ==========

    /// Replaces local state with the owner's entries from the store.
    ///
    /// On failure the previous entries are kept.
    pub async fn load(&self) -> Result<Vec<Entry>, LedgerError> {
        let scope = self.scope()?;
        let entries = self.fetch(&scope).await?;
        self.with_current(&scope, |state| state.entries.clone_from(&entries))?;

        info!(owner = %scope.session.owner, count = entries.len(), "Entries loaded");
        Ok(entries)
    }

    /// Records a new open debt.
    pub async fn add_entry(
        &self,
        counterparty: &str,
        principal: Decimal,
        direction: Direction,
    ) -> Result<Entry, LedgerError> {
        let scope = self.scope()?;
        let counterparty = validate_counterparty(counterparty)?;
        let principal = validate_principal(principal)?;

        let new_entry = NewEntry::open(scope.session.owner, counterparty, principal, direction);
        let entry = self.call(self.store.insert(&scope.session, &new_entry)).await?;
        self.reconcile(&scope, Mutation::Inserted(entry.clone())).await?;

        info!(owner = %scope.session.owner, entry_id = %entry.id, %direction, "Entry added");
        Ok(entry)
    }

    /// Deletes an entry. Unknown IDs are a no-op.
    pub async fn delete_entry(&self, id: EntryId) -> Result<(), LedgerError> {
        let scope = self.scope()?;
        self.call(self.store.delete(&scope.session, id)).await?;
        self.reconcile(&scope, Mutation::Deleted(id)).await?;

        info!(owner = %scope.session.owner, entry_id = %id, "Entry deleted");
        Ok(())
    }

    /// Settles an entry in full. Already-paid entries are returned as they are.
    pub async fn mark_paid(&self, id: EntryId) -> Result<Entry, LedgerError> {
        let (scope, current) = self.scoped_entry(id)?;
        if current.is_paid() {
            debug!(entry_id = %id, "Entry already paid");
            return Ok(current);
        }
        self.write(&scope, current.settled()).await
    }

    /// Records a partial payment. Overpayment is kept as-is.
    pub async fn add_payment(&self, id: EntryId, amount: Decimal) -> Result<Entry, LedgerError> {
        let (scope, current) = self.scoped_entry(id)?;
        let amount = validate_payment(amount)?;
        self.write(&scope, current.with_payment(amount)?).await
    }

    // ========== Internals ==========

    fn scope(&self) -> Result<Scope, LedgerError> {
        let state = self.state.lock();
        let session = state
            .gate
            .session()
            .cloned()
            .ok_or(LedgerError::Unauthenticated)?;
        Ok(Scope {
            session,
            generation: state.gate.generation(),
        })
    }

    fn scoped_entry(&self, id: EntryId) -> Result<(Scope, Entry), LedgerError> {
        let state = self.state.lock();
        let session = state
            .gate
            .session()
            .cloned()
            .ok_or(LedgerError::Unauthenticated)?;
        let entry = state
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(ValidationError::EntryNotFound(id))?;
        Ok((
            Scope {
                session,
                generation: state.gate.generation(),
            },
            entry,
        ))
    }

    /// Runs `f` on the state if the session that issued the request is still active.
    fn with_current<T>(
        &self,
        scope: &Scope,
        f: impl FnOnce(&mut LedgerState) -> T,
    ) -> Result<T, LedgerError> {
        let mut state = self.state.lock();
        if state.gate.generation() != scope.generation {
            warn!(
                owner = %scope.session.owner,
                "Session changed during request, discarding result"
            );
            return Err(LedgerError::Unauthenticated);
        }
        Ok(f(&mut state))
    }

    async fn call<T, F>(&self, request: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let timeout = self.settings.request_timeout;
        match tokio::time::timeout(timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(error = %e, "Ledger store call failed");
                Err(e.into())
            }
            Err(_) => {
                warn!(?timeout, "Ledger store call timed out");
                Err(StoreError::Timeout(timeout).into())
            }
        }
    }

    async fn bounded_auth<T, F>(&self, request: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, AuthError>>,
    {
        let timeout = self.settings.request_timeout;
        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result.map_err(|e| {
                warn!(error = %e, "Auth provider call failed");
                e.into()
            }),
            Err(_) => Err(AuthError::Timeout(timeout).into()),
        }
    }

    async fn fetch(&self, scope: &Scope) -> Result<Vec<Entry>, LedgerError> {
        let owner = scope.session.owner;
        let mut entries = self.call(self.store.select(&scope.session)).await?;

        entries.retain(|e| {
            if e.owner != owner {
                warn!(entry_id = %e.id, "Store returned an entry of another owner, skipping");
            }
            e.owner == owner
        });
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn reconcile(&self, scope: &Scope, mutation: Mutation) -> Result<(), LedgerError> {
        match self.settings.reconcile {
            ReconcilePolicy::LocalPatch => {
                self.with_current(scope, |state| mutation.apply(&mut state.entries))
            }
            ReconcilePolicy::FullReload => {
                let fresh = self.fetch(scope).await?;
                self.with_current(scope, |state| state.entries = fresh)
            }
        }
    }

    async fn write(&self, scope: &Scope, next: Entry) -> Result<Entry, LedgerError> {
        self.call(self.store.update(&scope.session, next.id, &next.as_patch()))
            .await?;
        self.reconcile(scope, Mutation::Updated(next.clone())).await?;

        info!(
            entry_id = %next.id,
            paid_amount = %next.paid_amount,
            status = ?next.status,
            "Entry updated"
        );
        Ok(self.entry(next.id).unwrap_or(next))
    }
}
