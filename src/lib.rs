//! # Sign-in Token Manager
//!
//! Obtains a short-lived token set (`access-token`, `client`, `expiry`, `uid`)
//! from a sign-in endpoint, caches it in memory and renews it before it
//! expires, shielding callers from conflicts, transient failures and
//! malformed responses.
//!
//! Modules:
//! - `auth` — credentials, sign-in transport, header extraction, 409 handling
//! - `manager` — the token manager: cache lookup, single-flight refresh
//! - `resilience` — retry policy and backoff
//! - `cache` — token cache entry
//! - `config` — YAML settings, auth values, validation

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod manager;
pub mod observability;
pub mod resilience;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::auth::credentials::Credentials;
pub use crate::auth::token::{AuthHeaders, RawToken};
pub use crate::error::AuthError;
pub use crate::manager::{ManagerSettings, TokenManager};
