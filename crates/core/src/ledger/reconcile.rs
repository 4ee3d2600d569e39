//! Bringing local state in line with a confirmed remote write.

use debtbook_shared::ReconcileMode;
use debtbook_shared::types::EntryId;

use super::entry::Entry;

/// Reconciliation strategy, fixed per controller and applied to every mutation.
pub type ReconcilePolicy = ReconcileMode;

/// A write the store has confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// A new entry was inserted.
    Inserted(Entry),
    /// An existing entry now has these values.
    Updated(Entry),
    /// The entry was deleted (or never existed).
    Deleted(EntryId),
}

impl Mutation {
    /// Applies the mutation to newest-first `entries`.
    ///
    /// Inserted entries are the newest, so they go to the front.
    pub fn apply(&self, entries: &mut Vec<Entry>) {
        match self {
            Self::Inserted(entry) => entries.insert(0, entry.clone()),
            Self::Updated(entry) => {
                if let Some(slot) = entries.iter_mut().find(|e| e.id == entry.id) {
                    *slot = entry.clone();
                }
            }
            Self::Deleted(id) => entries.retain(|e| e.id != *id),
        }
    }
}
