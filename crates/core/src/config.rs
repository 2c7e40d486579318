//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads process-wide environment variables;
//! binaries read them and hand the resolved values in here.

use crate::constants::DEFAULT_DATABASE_PATH;
use crate::{MedicationError, MedicationResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    database_path: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `MedicationError::InvalidInput` if `database_path` is empty or names an
    /// existing directory.
    pub fn new(database_path: PathBuf) -> MedicationResult<Self> {
        if database_path.as_os_str().is_empty() {
            return Err(MedicationError::InvalidInput(
                "database path cannot be empty".into(),
            ));
        }

        if database_path.is_dir() {
            return Err(MedicationError::InvalidInput(format!(
                "database path is a directory: {}",
                database_path.display()
            )));
        }

        Ok(Self { database_path })
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }
}

/// Resolve the database path from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_DATABASE_PATH`].
pub fn database_path_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_database_path_defaults_when_unset_or_blank() {
        assert_eq!(
            database_path_from_env_value(None),
            PathBuf::from(DEFAULT_DATABASE_PATH)
        );
        assert_eq!(
            database_path_from_env_value(Some("   ".into())),
            PathBuf::from(DEFAULT_DATABASE_PATH)
        );
    }

    #[test]
    fn test_database_path_uses_trimmed_value() {
        assert_eq!(
            database_path_from_env_value(Some(" /data/meds.db ".into())),
            PathBuf::from("/data/meds.db")
        );
    }

    #[test]
    fn test_core_config_rejects_empty_path() {
        let err = CoreConfig::new(PathBuf::new()).expect_err("empty path should be rejected");
        assert!(matches!(err, MedicationError::InvalidInput(msg) if msg.contains("cannot be empty")));
    }

    #[test]
    fn test_core_config_rejects_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let err = CoreConfig::new(temp_dir.path().to_path_buf())
            .expect_err("directory should be rejected");
        assert!(matches!(err, MedicationError::InvalidInput(msg) if msg.contains("is a directory")));
    }
}
