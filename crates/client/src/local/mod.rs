//! Self-contained auth: credentials and tokens managed in-process.

pub mod auth;
pub mod password;

pub use auth::LocalAuthProvider;
