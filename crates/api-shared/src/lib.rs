//! # API Shared
//!
//! Shared wire types and services for the Zenpic APIs.
//!
//! Contains:
//! - Request/response bodies (`types` module), serialised exactly as existing clients expect
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `zenpic-run` binary.

pub mod health;
pub mod types;

pub use health::HealthService;
pub use types::*;
