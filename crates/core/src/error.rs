use crate::medication::MedicationId;
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum MedicationError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("medication {0} not found")]
    NotFound(MedicationId),
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error(
        "database schema version {db_version} is newer than supported {latest_supported}"
    )]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    #[error("invalid value stored in column {column}: {value:?}")]
    InvalidStoredValue { column: &'static str, value: String },
}

impl MedicationError {
    /// Returns the structured field errors when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            MedicationError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for MedicationError {
    fn from(errors: ValidationErrors) -> Self {
        MedicationError::Validation(errors)
    }
}

pub type MedicationResult<T> = std::result::Result<T, MedicationError>;
