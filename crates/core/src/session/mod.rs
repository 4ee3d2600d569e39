//! Session gating and the auth provider contract.
//!
//! - `SessionGate`: the authenticated/anonymous state machine
//! - `AuthProvider`: sign-in, sign-out, restore, change notifications
//! - `SessionListeners`/`Subscription`: listener registry with a single teardown path

pub mod gate;
pub mod provider;

pub use gate::{SessionGate, Transition};
pub use provider::{AuthError, AuthProvider, SessionListener, SessionListeners, Subscription};
