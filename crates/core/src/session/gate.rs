//! Session gate: `Anonymous -> Authenticated(session) -> Anonymous`.

use debtbook_shared::Session;
use debtbook_shared::types::UserId;

/// Outcome of feeding a session change into the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed.
    Unchanged,
    /// Same owner, new tokens.
    Refreshed,
    /// `Anonymous -> Authenticated`.
    SignedIn,
    /// Authenticated as a different owner than before.
    SwitchedOwner,
    /// `Authenticated -> Anonymous`.
    SignedOut,
}

impl Transition {
    /// Returns true if data loaded for the previous owner must be dropped.
    #[must_use]
    pub const fn clears_entries(self) -> bool {
        matches!(self, Self::SwitchedOwner | Self::SignedOut)
    }

    /// Returns true if the owner behind the gate changed.
    #[must_use]
    pub const fn changes_owner(self) -> bool {
        matches!(self, Self::SignedIn | Self::SwitchedOwner | Self::SignedOut)
    }
}

/// Holds the active session, if any.
///
/// `generation` increases on every owner change, so an operation that
/// started under one owner can tell its result is stale.
#[derive(Debug, Default)]
pub struct SessionGate {
    session: Option<Session>,
    generation: u64,
}

impl SessionGate {
    /// Creates an anonymous gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The single transition function.
    pub fn apply(&mut self, next: Option<Session>) -> Transition {
        let transition = match (&self.session, &next) {
            (None, None) => Transition::Unchanged,
            (None, Some(_)) => Transition::SignedIn,
            (Some(_), None) => Transition::SignedOut,
            (Some(current), Some(new)) if current.owner == new.owner => {
                if current == new {
                    Transition::Unchanged
                } else {
                    Transition::Refreshed
                }
            }
            (Some(_), Some(_)) => Transition::SwitchedOwner,
        };

        if transition.changes_owner() {
            self.generation += 1;
        }
        self.session = next;
        transition
    }

    /// The active session.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Owner of the active session.
    #[must_use]
    pub fn owner(&self) -> Option<UserId> {
        self.session.as_ref().map(|s| s.owner)
    }

    /// Returns true while authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Counter bumped on every owner change.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
