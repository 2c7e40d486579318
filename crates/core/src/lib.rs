//! # Medication Core
//!
//! Core logic for the medication records catalog.
//!
//! This crate contains the entity, its validation rules and data access:
//! - `Medication` / `MedicationRecord` and the end-date invariant
//! - A SQLite record store that re-validates every write
//! - The query/ingestion gateway converting to and from wire payloads
//!
//! **No API concerns**: HTTP servers and routing belong in `api-rest`; wire
//! shapes live in `api-shared`.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod gateway;
pub mod medication;
pub mod payload;
pub mod store;
pub mod validation;

pub use config::CoreConfig;
pub use error::{MedicationError, MedicationResult};
pub use gateway::MedicationGateway;
pub use medication::{Medication, MedicationId, MedicationRecord};
pub use store::{
    Direction, MedicationStore, OrderBy, SortField, SqliteMedicationStore, DEFAULT_ORDERING,
};
pub use validation::{FieldError, ValidationErrors};

pub use constants::DEFAULT_DATABASE_PATH;
