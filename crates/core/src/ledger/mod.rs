//! Personal debt ledger.
//!
//! This module implements the ledger functionality:
//! - Debt entries and their wire shape
//! - Outstanding totals
//! - Input validation
//! - The store contract
//! - Reconciliation of local state after confirmed writes
//! - The controller tying it all to the active session

pub mod balance;
pub mod controller;
pub mod entry;
pub mod error;
pub mod reconcile;
pub mod store;
pub mod validation;

#[cfg(test)]
mod balance_props;

pub use balance::{Totals, totals};
pub use controller::{ControllerSettings, LedgerController, SessionHandle};
pub use entry::{Direction, Entry, EntryPatch, EntryStatus, NewEntry};
pub use error::{LedgerError, StoreError, ValidationError};
pub use reconcile::{Mutation, ReconcilePolicy};
pub use store::LedgerStore;
pub use validation::parse_amount;
