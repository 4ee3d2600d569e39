//! Application configuration management.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Remote ledger store and auth endpoint.
    pub store: StoreConfig,
    /// Session handling.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Ledger controller behaviour.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Remote backend configuration.
///
/// The same project URL serves the table API and the auth API.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Public API key sent with every request.
    pub anon_key: String,
    /// Table holding the debt entries.
    #[serde(default = "default_table")]
    pub table: String,
    /// Upper bound for any single remote call.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_table() -> String {
    "entries".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl StoreConfig {
    /// Returns the request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Session handling configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Where the current session is persisted between runs.
    pub session_file: Option<PathBuf>,
}

/// How local state catches up with a confirmed remote write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// Apply the confirmed change to local state.
    #[default]
    LocalPatch,
    /// Re-select every entry from the store.
    FullReload,
}

/// Ledger controller configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LedgerConfig {
    /// Reconciliation strategy applied to every mutation.
    #[serde(default)]
    pub reconcile: ReconcileMode,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("DEBTBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
