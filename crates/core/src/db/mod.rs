//! SQLite connection bootstrap and schema upgrades.
//!
//! Every store operation opens its own connection through [`open_db`]; the
//! process holds no connection between requests. [`initialise_database`] is run
//! once at startup so that the file exists and the schema is current before any
//! request arrives.
//!
//! The schema version lives in `PRAGMA user_version`. Each script in
//! [`SCHEMA_SCRIPTS`] brings the file to the version it is listed under.

use crate::config::CoreConfig;
use crate::constants::BUSY_TIMEOUT_SECS;
use crate::{MedicationError, MedicationResult};
use rusqlite::Connection;
use std::cmp::Ordering;
use std::path::Path;
use std::time::{Duration, Instant};

/// Schema scripts keyed by the version they produce, oldest first.
const SCHEMA_SCRIPTS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

/// Schema version written by this build.
pub fn schema_version() -> u32 {
    SCHEMA_SCRIPTS.last().map_or(0, |&(version, _)| version)
}

fn stored_schema_version(conn: &Connection) -> MedicationResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Runs every script newer than the stored version in one transaction.
///
/// A file stamped with a newer version than this build knows is refused rather
/// than read with the wrong table layout.
fn upgrade_schema(conn: &mut Connection) -> MedicationResult<()> {
    let stored = stored_schema_version(conn)?;
    let target = schema_version();

    match stored.cmp(&target) {
        Ordering::Equal => return Ok(()),
        Ordering::Greater => {
            return Err(MedicationError::UnsupportedSchemaVersion {
                db_version: stored,
                latest_supported: target,
            });
        }
        Ordering::Less => {}
    }

    let tx = conn.transaction()?;
    for &(version, sql) in SCHEMA_SCRIPTS.iter().filter(|&&(version, _)| version > stored) {
        tracing::info!(from = stored, to = version, "upgrading medication schema");
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    Ok(())
}

/// Opens the database file at `path` and brings its schema up to date.
///
/// The upgrade is a no-op once the schema is current, so this is cheap
/// to call per operation.
///
/// # Errors
///
/// Returns `MedicationError::Database` if the file cannot be opened or
/// configured, and `MedicationError::UnsupportedSchemaVersion` if it was
/// written by a newer binary.
pub fn open_db(path: impl AsRef<Path>) -> MedicationResult<Connection> {
    let mut conn = Connection::open(path)?;
    conn.busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS))?;
    upgrade_schema(&mut conn)?;
    Ok(conn)
}

/// Creates (if needed) and migrates the configured database.
///
/// # Errors
///
/// Propagates any error from [`open_db`], after logging it.
pub fn initialise_database(cfg: &CoreConfig) -> MedicationResult<()> {
    let started_at = Instant::now();
    let path = cfg.database_path();

    match open_db(path) {
        Ok(_conn) => {
            tracing::info!(
                path = %path.display(),
                schema_version = schema_version(),
                duration_ms = started_at.elapsed().as_millis() as u64,
                "database ready"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(path = %path.display(), "database initialisation failed: {e}");
            Err(e)
        }
    }
}
