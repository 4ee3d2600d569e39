//! Shared types, errors, and configuration for Debtbook.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for entries and owners
//! - The authenticated `Session` and auth wire payloads
//! - Locally issued session tokens
//! - Application-wide error types
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Credentials, Session};
pub use config::{AppConfig, ReconcileMode};
pub use error::{AppError, AppResult};
pub use jwt::{SessionTokenService, TokenClaims, TokenConfig, TokenError};
