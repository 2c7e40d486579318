//! Constants used throughout the medication core crate.
//!
//! Field limits live here so the payload checks, the store checks and the
//! table definition in `db/0001_init.sql` can be kept in step.

/// Default SQLite database file when no explicit path is configured.
pub const DEFAULT_DATABASE_PATH: &str = "medications.sqlite3";

/// Table holding one row per medication record.
pub const MEDICATIONS_TABLE: &str = "medications";

/// How long a connection waits on a locked database before giving up, in seconds.
pub const BUSY_TIMEOUT_SECS: u64 = 5;

/// Maximum length of `name`, in characters.
pub const NAME_MAX_CHARS: usize = 200;

/// Maximum length of `dose`, in characters.
pub const DOSE_MAX_CHARS: usize = 100;

/// Maximum length of `route`, in characters.
pub const ROUTE_MAX_CHARS: usize = 50;

/// Maximum length of `facility`, in characters.
pub const FACILITY_MAX_CHARS: usize = 200;

/// Calendar date format used on the wire and in storage.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Earliest year a stored date may carry. SQLite's `date()` only round-trips
/// four-digit years, which the table's `CHECK` constraints rely on.
pub const DATE_MIN_YEAR: i32 = 0;

/// Latest year a stored date may carry.
pub const DATE_MAX_YEAR: i32 = 9999;
