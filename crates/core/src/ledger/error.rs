//! Ledger error types.
//!
//! Three kinds of failure reach the caller: bad input (rejected before any
//! side effect), no active session, and an unreachable store. None of them
//! leave local state partially updated.

use std::time::Duration;

use debtbook_shared::AppError;
use debtbook_shared::types::EntryId;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::session::AuthError;

/// Input rejected before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Counterparty name is empty or blank.
    #[error("Counterparty name cannot be empty")]
    EmptyCounterparty,

    /// Principal must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    NonPositivePrincipal(Decimal),

    /// Payment must be strictly positive.
    #[error("Payment must be positive, got {0}")]
    NonPositivePayment(Decimal),

    /// Amount text could not be parsed.
    #[error("Not a valid amount: {0:?}")]
    InvalidAmount(String),

    /// No entry with this ID is loaded.
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    /// The cumulative paid amount would not fit in a `Decimal`.
    #[error("Payment total out of range for entry {0}")]
    AmountOverflow(EntryId),
}

/// Failures of a ledger store call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The call did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Network-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with an error status.
    #[error("rejected with status {status}: {message}")]
    Rejected {
        /// HTTP-style status code.
        status: u16,
        /// Backend message.
        message: String,
    },

    /// The backend answered with a body that could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Returns true for failures that may go away on their own.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Transport(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Decode(_) => false,
        }
    }
}

/// Errors returned by ledger controller operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Caller-fixable input problem.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No active session, or the session changed mid-operation.
    #[error("No active session")]
    Unauthenticated,

    /// The ledger store failed; local state is unchanged.
    #[error("Ledger store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// The auth provider failed or refused the credentials.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl LedgerError {
    /// Returns the error code for reporting.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Auth(_) => "AUTH_ERROR",
        }
    }

    /// Returns true if trying again later might succeed.
    ///
    /// Nothing retries automatically; this only informs the user.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::StoreUnavailable(e) => e.is_transient(),
            Self::Auth(e) => e.is_transient(),
            Self::Validation(_) | Self::Unauthenticated => false,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(e) => Self::Validation(e.to_string()),
            LedgerError::Unauthenticated => {
                Self::Unauthenticated("sign in to access your entries".to_string())
            }
            LedgerError::StoreUnavailable(e) => Self::StoreUnavailable(e.to_string()),
            LedgerError::Auth(e) => Self::Auth(e.to_string()),
        }
    }
}
