//! Ledger store contract.
//!
//! Every call is scoped by the active session so the backend can enforce
//! row ownership: rows of other owners are invisible to select, and
//! update or delete of them is a no-op.

use async_trait::async_trait;
use debtbook_shared::Session;
use debtbook_shared::types::EntryId;

use super::entry::{Entry, EntryPatch, NewEntry};
use super::error::StoreError;

/// Remote, multi-tenant table of debt entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Returns all entries of `session.owner`, newest first by `created_at`.
    async fn select(&self, session: &Session) -> Result<Vec<Entry>, StoreError>;

    /// Persists a new entry; the store assigns `id` and `created_at`.
    async fn insert(&self, session: &Session, entry: &NewEntry) -> Result<Entry, StoreError>;

    /// Applies `patch` to the entry with `id`.
    async fn update(
        &self,
        session: &Session,
        id: EntryId,
        patch: &EntryPatch,
    ) -> Result<(), StoreError>;

    /// Deletes the entry with `id`. Unknown IDs are not an error.
    async fn delete(&self, session: &Session, id: EntryId) -> Result<(), StoreError>;
}
