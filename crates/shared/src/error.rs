//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every variant is recoverable: the front end reports it and returns to a
/// consistent state.
#[derive(Debug, Error)]
pub enum AppError {
    /// No active session.
    #[error("Not signed in: {0}")]
    Unauthenticated(String),

    /// Input rejected before any side effect.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The ledger store could not be reached or refused the request.
    #[error("Ledger store unavailable: {0}")]
    StoreUnavailable(String),

    /// The auth provider rejected or failed the request.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Unauthenticated(_) | Self::Auth(_) => 3,
            Self::StoreUnavailable(_) => 4,
            Self::Config(_) => 5,
            Self::Internal(_) => 1,
        }
    }

    /// Returns a stable error code for reporting.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Auth(_) => "AUTH_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
