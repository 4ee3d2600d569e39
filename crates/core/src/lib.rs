//! Core ledger logic for Debtbook.
//!
//! This crate contains the ledger rules and the session gate with ZERO http
//! dependencies. Remote backends plug in through the `LedgerStore` and
//! `AuthProvider` traits.
//!
//! # Modules
//!
//! - `ledger` - Entries, payments, totals and the ledger controller
//! - `session` - Session gate and the auth provider contract

pub mod ledger;
pub mod session;

pub use ledger::{
    ControllerSettings, Direction, Entry, EntryStatus, LedgerController, LedgerError, LedgerStore,
    StoreError, Totals, ValidationError,
};
pub use session::{AuthError, AuthProvider, SessionGate, Subscription, Transition};
