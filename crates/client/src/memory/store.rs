//! In-process ledger store.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use debtbook_core::ledger::{Entry, EntryPatch, LedgerStore, NewEntry, StoreError};
use debtbook_shared::Session;
use debtbook_shared::types::EntryId;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Ledger store kept in memory.
///
/// Enforces ownership the way row-level security would: rows of other owners
/// are invisible to select, and update or delete of them changes nothing.
/// Expired sessions are rejected with status 401.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    rows: Mutex<Vec<Entry>>,
    failures: Mutex<VecDeque<StoreError>>,
    clock: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call fail with `error`. Queued failures are used in order.
    pub fn fail_next(&self, error: StoreError) {
        self.failures.lock().push_back(error);
    }

    /// Inserts a row as-is, bypassing ownership checks.
    pub fn seed(&self, entry: Entry) {
        self.rows.lock().push(entry);
    }

    /// Every row of every owner, in insertion order.
    #[must_use]
    pub fn rows(&self) -> Vec<Entry> {
        self.rows.lock().clone()
    }

    fn check(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(error) = self.failures.lock().pop_front() {
            debug!(error = %error, "Injected store failure");
            return Err(error);
        }
        if session.is_expired() {
            return Err(StoreError::Rejected {
                status: 401,
                message: "JWT expired".to_string(),
            });
        }
        Ok(())
    }

    /// Strictly increasing creation timestamps, so newest-first order is total.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut last = self.clock.lock();
        let now = Utc::now();
        let next = match *last {
            Some(previous) if now <= previous => previous + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn select(&self, session: &Session) -> Result<Vec<Entry>, StoreError> {
        self.check(session)?;

        let mut entries: Vec<Entry> = self
            .rows
            .lock()
            .iter()
            .filter(|e| e.owner == session.owner)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn insert(&self, session: &Session, entry: &NewEntry) -> Result<Entry, StoreError> {
        self.check(session)?;
        if entry.owner != session.owner {
            return Err(StoreError::Rejected {
                status: 403,
                message: "new row violates row-level security policy".to_string(),
            });
        }

        let stored = Entry {
            id: EntryId::from_uuid(Uuid::now_v7()),
            owner: entry.owner,
            counterparty: entry.counterparty.clone(),
            principal: entry.principal,
            paid_amount: entry.paid_amount,
            direction: entry.direction,
            status: entry.status,
            created_at: self.next_timestamp(),
        };
        self.rows.lock().push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        session: &Session,
        id: EntryId,
        patch: &EntryPatch,
    ) -> Result<(), StoreError> {
        self.check(session)?;

        if let Some(row) = self
            .rows
            .lock()
            .iter_mut()
            .find(|e| e.id == id && e.owner == session.owner)
        {
            row.paid_amount = patch.paid_amount;
            row.status = patch.status;
        }
        Ok(())
    }

    async fn delete(&self, session: &Session, id: EntryId) -> Result<(), StoreError> {
        self.check(session)?;

        self.rows
            .lock()
            .retain(|e| !(e.id == id && e.owner == session.owner));
        Ok(())
    }
}
