//! Ledger store and auth adapters for Debtbook.
//!
//! - `rest` - hosted backend: PostgREST-style table API and GoTrue-style auth API
//! - `memory` - in-process ledger store with row ownership and failure injection
//! - `local` - in-process auth with Argon2id credentials and HS256 session tokens
//! - `session_file` - session persistence between runs

pub mod local;
pub mod memory;
pub mod rest;
pub mod session_file;

mod slot;

pub use local::LocalAuthProvider;
pub use memory::MemoryLedgerStore;
pub use rest::{RestAuthProvider, RestLedgerStore};
pub use session_file::{SessionFile, SessionFileError};
