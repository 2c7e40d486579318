//! Medication record store.
//!
//! The store is the final authority on record validity: [`MedicationStore::save`]
//! runs the full-entity checks on every write, whatever path the write came
//! from, and the table carries matching `CHECK` constraints underneath.
//!
//! Listing takes an explicit ordering. [`DEFAULT_ORDERING`] is the catalog order
//! (`start_date` ascending, then `id` ascending); any ordering that does not
//! mention `id` gets `id ASC` appended so ties are always broken the same way.

use crate::config::CoreConfig;
use crate::constants::DATE_FORMAT;
use crate::db::open_db;
use crate::medication::{Medication, MedicationId, MedicationRecord};
use crate::{MedicationError, MedicationResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;

/// Columns a listing may be ordered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Dose,
    Route,
    StartDate,
    EndDate,
    Facility,
}

impl SortField {
    fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Dose => "dose",
            SortField::Route => "route",
            SortField::StartDate => "start_date",
            SortField::EndDate => "end_date",
            SortField::Facility => "facility",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One `ORDER BY` term.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub field: SortField,
    pub direction: Direction,
}

impl OrderBy {
    pub const fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub const fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }
}

/// Catalog order: `start_date` ascending, ties broken by `id` ascending.
pub const DEFAULT_ORDERING: [OrderBy; 2] = [
    OrderBy::asc(SortField::StartDate),
    OrderBy::asc(SortField::Id),
];

/// Persistence contract for medication records.
pub trait MedicationStore {
    /// Validates `medication` in full and persists it.
    ///
    /// With `id: None` a new row is inserted and its id assigned. With
    /// `Some(id)` the existing row is replaced.
    ///
    /// # Errors
    ///
    /// - `MedicationError::Validation` if any field fails, including
    ///   `end_date` before `start_date`. Nothing is written.
    /// - `MedicationError::NotFound` if `id` names no existing row.
    fn save(
        &self,
        id: Option<MedicationId>,
        medication: Medication,
    ) -> MedicationResult<MedicationRecord>;

    /// Fetches one record.
    ///
    /// # Errors
    ///
    /// Returns `MedicationError::NotFound` if no row has this id.
    fn get(&self, id: MedicationId) -> MedicationResult<MedicationRecord>;

    /// All records in the given order.
    fn list(&self, order_by: &[OrderBy]) -> MedicationResult<Vec<MedicationRecord>>;
}

/// SQLite-backed store. Opens a fresh connection per operation.
#[derive(Clone, Debug)]
pub struct SqliteMedicationStore {
    cfg: Arc<CoreConfig>,
}

impl SqliteMedicationStore {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    fn connect(&self) -> MedicationResult<Connection> {
        open_db(self.cfg.database_path())
    }
}

impl MedicationStore for SqliteMedicationStore {
    fn save(
        &self,
        id: Option<MedicationId>,
        medication: Medication,
    ) -> MedicationResult<MedicationRecord> {
        if let Err(errors) = medication.validate() {
            tracing::warn!(%medication, %errors, "store rejected medication");
            return Err(MedicationError::Validation(errors));
        }

        let conn = self.connect()?;
        let start_date = format_date(medication.start_date);
        let end_date = medication.end_date.map(format_date);

        let id = match id {
            None => {
                conn.execute(
                    "INSERT INTO medications (name, dose, route, start_date, end_date, facility)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                    params![
                        medication.name,
                        medication.dose,
                        medication.route,
                        start_date,
                        end_date,
                        medication.facility,
                    ],
                )?;
                let id = MedicationId::new(conn.last_insert_rowid());
                tracing::debug!(%id, %medication, "inserted medication");
                id
            }
            Some(id) => {
                let changed = conn.execute(
                    "UPDATE medications
                     SET name = ?2, dose = ?3, route = ?4, start_date = ?5, end_date = ?6, facility = ?7
                     WHERE id = ?1;",
                    params![
                        id.get(),
                        medication.name,
                        medication.dose,
                        medication.route,
                        start_date,
                        end_date,
                        medication.facility,
                    ],
                )?;
                if changed == 0 {
                    return Err(MedicationError::NotFound(id));
                }
                tracing::debug!(%id, %medication, "updated medication");
                id
            }
        };

        Ok(MedicationRecord { id, medication })
    }

    fn get(&self, id: MedicationId) -> MedicationResult<MedicationRecord> {
        let conn = self.connect()?;
        let row = conn
            .query_row(
                "SELECT id, name, dose, route, start_date, end_date, facility
                 FROM medications
                 WHERE id = ?1;",
                [id.get()],
                StoredRow::from_row,
            )
            .optional()?;

        match row {
            Some(row) => row.into_record(),
            None => Err(MedicationError::NotFound(id)),
        }
    }

    fn list(&self, order_by: &[OrderBy]) -> MedicationResult<Vec<MedicationRecord>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT id, name, dose, route, start_date, end_date, facility
             FROM medications
             ORDER BY {};",
            order_clause(order_by)
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], StoredRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }

        tracing::debug!(count = records.len(), "listed medications");
        Ok(records)
    }
}

/// Builds the `ORDER BY` body from whitelisted columns only.
fn order_clause(order_by: &[OrderBy]) -> String {
    let mut terms: Vec<String> = order_by
        .iter()
        .map(|o| format!("{} {}", o.field.column(), o.direction.keyword()))
        .collect();

    if !order_by.iter().any(|o| o.field == SortField::Id) {
        terms.push("id ASC".into());
    }

    terms.join(", ")
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_stored_date(column: &'static str, value: String) -> MedicationResult<NaiveDate> {
    NaiveDate::parse_from_str(&value, DATE_FORMAT)
        .map_err(|_| MedicationError::InvalidStoredValue { column, value })
}

/// Raw column values, converted to a record outside the rusqlite row callback.
struct StoredRow {
    id: i64,
    name: String,
    dose: String,
    route: String,
    start_date: String,
    end_date: Option<String>,
    facility: String,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            dose: row.get("dose")?,
            route: row.get("route")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            facility: row.get("facility")?,
        })
    }

    fn into_record(self) -> MedicationResult<MedicationRecord> {
        let start_date = parse_stored_date("start_date", self.start_date)?;
        let end_date = self
            .end_date
            .map(|value| parse_stored_date("end_date", value))
            .transpose()?;

        Ok(MedicationRecord {
            id: MedicationId::new(self.id),
            medication: Medication {
                name: self.name,
                dose: self.dose,
                route: self.route,
                start_date,
                end_date,
                facility: self.facility,
            },
        })
    }
}
