//! Debt entry domain types.
//!
//! Field names on the wire follow the remote table's columns:
//! `user_id`, `person`, `amount`, `paid_amount`, `type`, `status`, `created_at`.

use chrono::{DateTime, Utc};
use debtbook_shared::types::{EntryId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::ValidationError;

/// Who owes whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Someone owes the user.
    #[serde(rename = "toMe")]
    OwedToUser,
    /// The user owes someone.
    #[serde(rename = "iOwe")]
    OwedByUser,
}

impl Direction {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OwedToUser => "toMe",
            Self::OwedByUser => "iOwe",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "tome" | "owedtouser" => Ok(Self::OwedToUser),
            "iowe" | "owedbyuser" => Ok(Self::OwedByUser),
            _ => Err(format!("Unknown direction: {s}")),
        }
    }
}

/// Settlement state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Some of the principal is still outstanding.
    Open,
    /// Paid amount has reached the principal.
    Paid,
}

impl EntryStatus {
    /// Derives the status from the amounts: `Paid` iff `paid >= principal`.
    #[must_use]
    pub fn for_amounts(principal: Decimal, paid: Decimal) -> Self {
        if paid >= principal {
            Self::Paid
        } else {
            Self::Open
        }
    }
}

/// One debt record owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EntryRow")]
pub struct Entry {
    /// Store-assigned identifier.
    pub id: EntryId,
    /// Owner of the entry.
    #[serde(rename = "user_id")]
    pub owner: UserId,
    /// The other party.
    #[serde(rename = "person")]
    pub counterparty: String,
    /// Amount fixed at creation.
    #[serde(rename = "amount")]
    pub principal: Decimal,
    /// Cumulative amount paid toward the principal. May exceed it.
    pub paid_amount: Decimal,
    /// Direction of the debt.
    #[serde(rename = "type")]
    pub direction: Direction,
    /// Settlement state, always consistent with the amounts.
    pub status: EntryStatus,
    /// Store-assigned creation time, the sort key.
    pub created_at: DateTime<Utc>,
}

/// Row shape as stored remotely. Rows from the local-only era have neither
/// `paid_amount` nor `status`.
#[derive(Deserialize)]
struct EntryRow {
    id: EntryId,
    user_id: UserId,
    person: String,
    amount: Decimal,
    #[serde(default)]
    paid_amount: Option<Decimal>,
    #[serde(rename = "type")]
    direction: Direction,
    #[serde(default)]
    status: Option<EntryStatus>,
    created_at: DateTime<Utc>,
}

impl From<EntryRow> for Entry {
    fn from(row: EntryRow) -> Self {
        let paid_amount = row.paid_amount.unwrap_or(Decimal::ZERO);
        let status = EntryStatus::for_amounts(row.amount, paid_amount);
        if row.status.is_some_and(|stored| stored != status) {
            warn!(entry_id = %row.id, ?status, "Stored status disagrees with amounts, normalizing");
        }

        Self {
            id: row.id,
            owner: row.user_id,
            counterparty: row.person,
            principal: row.amount,
            paid_amount,
            direction: row.direction,
            status,
            created_at: row.created_at,
        }
    }
}

impl Entry {
    /// Amount still owed. Negative once overpaid.
    ///
    /// Saturates at the `Decimal` bounds for rows written outside the
    /// amount limits.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        self.principal.saturating_sub(self.paid_amount)
    }

    /// Returns true if the entry is settled.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status == EntryStatus::Paid
    }

    /// Returns this entry after a payment of `amount`.
    ///
    /// No clamp: overpayment is recorded as-is.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::AmountOverflow` if the cumulative paid
    /// amount no longer fits in a `Decimal`.
    pub fn with_payment(&self, amount: Decimal) -> Result<Self, ValidationError> {
        let paid_amount = self
            .paid_amount
            .checked_add(amount)
            .ok_or(ValidationError::AmountOverflow(self.id))?;
        Ok(Self {
            paid_amount,
            status: EntryStatus::for_amounts(self.principal, paid_amount),
            ..self.clone()
        })
    }

    /// Returns this entry fully settled.
    ///
    /// Already-paid entries come back unchanged, overpayment included.
    #[must_use]
    pub fn settled(&self) -> Self {
        if self.is_paid() {
            return self.clone();
        }
        Self {
            paid_amount: self.principal,
            status: EntryStatus::Paid,
            ..self.clone()
        }
    }

    /// The patch that turns the stored row into `self`.
    #[must_use]
    pub fn as_patch(&self) -> EntryPatch {
        EntryPatch {
            paid_amount: self.paid_amount,
            status: self.status,
        }
    }
}

/// Insert payload for a new entry. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEntry {
    /// Owner taken from the active session.
    #[serde(rename = "user_id")]
    pub owner: UserId,
    /// The other party.
    #[serde(rename = "person")]
    pub counterparty: String,
    /// Positive principal.
    #[serde(rename = "amount")]
    pub principal: Decimal,
    /// Direction of the debt.
    #[serde(rename = "type")]
    pub direction: Direction,
    /// Always zero on creation.
    pub paid_amount: Decimal,
    /// Always `Open` on creation.
    pub status: EntryStatus,
}

impl NewEntry {
    /// Creates an open, unpaid entry payload.
    #[must_use]
    pub fn open(
        owner: UserId,
        counterparty: String,
        principal: Decimal,
        direction: Direction,
    ) -> Self {
        Self {
            owner,
            counterparty,
            principal,
            direction,
            paid_amount: Decimal::ZERO,
            status: EntryStatus::Open,
        }
    }
}

/// The only fields an update may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryPatch {
    /// New cumulative paid amount.
    pub paid_amount: Decimal,
    /// Status matching `paid_amount`.
    pub status: EntryStatus,
}
