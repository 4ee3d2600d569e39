//! In-process ledger store.

pub mod store;

pub use store::MemoryLedgerStore;
