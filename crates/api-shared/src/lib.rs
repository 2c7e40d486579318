//! # API Shared
//!
//! Shared definitions for the medication catalog APIs.
//!
//! Contains:
//! - Wire models (`wire` module) serialised by the REST API and the CLI
//! - Shared services like `HealthService`
//!
//! Used by `medrec-core` (gateway serialisation) and `api-rest`.

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::*;
