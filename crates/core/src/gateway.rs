//! Query/ingestion gateway.
//!
//! The externally reachable surface over a [`MedicationStore`]. Reads are served
//! in catalog order and converted to wire objects. Writes arrive as untyped
//! payloads, are validated here first and then handed to the store, which
//! validates again before persisting.
//!
//! No HTTP route calls [`MedicationGateway::ingest`]; it is the write path for
//! operator tooling.

use crate::medication::{MedicationId, MedicationRecord};
use crate::payload;
use crate::store::{MedicationStore, DEFAULT_ORDERING};
use crate::validation::ValidationErrors;
use crate::{Medication, MedicationError, MedicationResult};
use api_shared::wire::MedicationRes;
use serde_json::Value;

/// Converts a persisted record to its wire shape.
pub fn to_wire(record: MedicationRecord) -> MedicationRes {
    let MedicationRecord { id, medication } = record;
    MedicationRes {
        id: id.get(),
        name: medication.name,
        dose: medication.dose,
        route: medication.route,
        start_date: medication.start_date,
        end_date: medication.end_date,
        facility: medication.facility,
    }
}

#[derive(Clone, Debug)]
pub struct MedicationGateway<S> {
    store: S,
}

impl<S: MedicationStore> MedicationGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All medications, ordered by `start_date` then `id`.
    pub fn list_medications(&self) -> MedicationResult<Vec<MedicationRes>> {
        let records = self.store.list(&DEFAULT_ORDERING)?;
        Ok(records.into_iter().map(to_wire).collect())
    }

    /// One medication by id.
    ///
    /// # Errors
    ///
    /// Returns `MedicationError::NotFound` if the store has no such record.
    pub fn get_medication(&self, id: MedicationId) -> MedicationResult<MedicationRes> {
        self.store.get(id).map(to_wire)
    }

    /// Validates an inbound payload without touching the store.
    ///
    /// # Errors
    ///
    /// Returns field-keyed errors; see [`payload::validate_payload`].
    pub fn validate_payload(&self, data: &Value) -> Result<Medication, ValidationErrors> {
        payload::validate_payload(data)
    }

    /// Validates `data` and inserts it as a new record.
    ///
    /// # Errors
    ///
    /// Returns `MedicationError::Validation` from either layer, or any store error.
    pub fn ingest(&self, data: &Value) -> MedicationResult<MedicationRes> {
        let medication = match self.validate_payload(data) {
            Ok(medication) => medication,
            Err(errors) => {
                tracing::warn!(%errors, "gateway rejected medication payload");
                return Err(MedicationError::Validation(errors));
            }
        };

        let record = self.store.save(None, medication)?;
        tracing::info!(id = %record.id, medication = %record.medication, "ingested medication");
        Ok(to_wire(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::store::SqliteMedicationStore;
    use crate::validation::END_DATE_BEFORE_START;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_gateway(temp_dir: &TempDir) -> MedicationGateway<SqliteMedicationStore> {
        let cfg = CoreConfig::new(temp_dir.path().join("meds.sqlite3"))
            .expect("CoreConfig::new should succeed");
        MedicationGateway::new(SqliteMedicationStore::new(Arc::new(cfg)))
    }

    fn lisinopril(end_date: &str) -> Value {
        json!({
            "name": "Lisinopril",
            "dose": "10mg",
            "route": "oral",
            "start_date": "2024-01-01",
            "end_date": end_date,
            "facility": "Clinic A",
        })
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_lisinopril_accepted_then_rejected_with_earlier_end() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let gateway = test_gateway(&temp_dir);

        let created = gateway
            .ingest(&lisinopril("2024-06-01"))
            .expect("ingest should succeed");

        let listed = gateway.list_medications().unwrap();
        assert_eq!(listed, vec![created.clone()]);
        assert_eq!(
            serde_json::to_value(&listed[0]).unwrap()["end_date"],
            json!("2024-06-01")
        );

        let err = gateway
            .ingest(&lisinopril("2023-12-31"))
            .expect_err("ingest should reject");
        let errors = err.validation_errors().expect("validation error");
        assert_eq!(
            errors.get("end_date"),
            Some(&[END_DATE_BEFORE_START.to_string()][..])
        );
        assert_eq!(gateway.list_medications().unwrap().len(), 1);
    }

    #[test]
    fn test_gateway_and_store_report_the_same_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let gateway = test_gateway(&temp_dir);

        let gateway_errors = gateway
            .validate_payload(&lisinopril("2023-12-31"))
            .expect_err("gateway should reject");

        // Bypass the gateway and write straight to the store.
        let medication = Medication {
            name: "Lisinopril".into(),
            dose: "10mg".into(),
            route: "oral".into(),
            start_date: date(2024, 1, 1),
            end_date: Some(date(2023, 12, 31)),
            facility: "Clinic A".into(),
        };
        let store_err = gateway
            .store()
            .save(None, medication)
            .expect_err("store should reject");

        assert_eq!(store_err.validation_errors(), Some(&gateway_errors));
    }

    #[test]
    fn test_store_write_read_back_through_wire_is_field_for_field() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let gateway = test_gateway(&temp_dir);

        let saved = gateway
            .store()
            .save(
                None,
                Medication {
                    name: "Metformin".into(),
                    dose: "500mg".into(),
                    route: "oral".into(),
                    start_date: date(2023, 3, 9),
                    end_date: None,
                    facility: "Clinic B".into(),
                },
            )
            .unwrap();

        let wire = serde_json::to_value(gateway.get_medication(saved.id).unwrap()).unwrap();
        assert_eq!(
            wire,
            json!({
                "id": saved.id.get(),
                "name": "Metformin",
                "dose": "500mg",
                "route": "oral",
                "start_date": "2023-03-09",
                "end_date": null,
                "facility": "Clinic B",
            })
        );
    }

    #[test]
    fn test_list_medications_uses_catalog_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let gateway = test_gateway(&temp_dir);

        let mut later = lisinopril("");
        later["start_date"] = json!("2024-02-01");
        let later = gateway.ingest(&later).unwrap();
        let first_of_pair = gateway.ingest(&lisinopril("")).unwrap();
        let second_of_pair = gateway.ingest(&lisinopril("")).unwrap();

        let ids: Vec<i64> = gateway
            .list_medications()
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![first_of_pair.id, second_of_pair.id, later.id]);
    }

    #[test]
    fn test_get_medication_unknown_id_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let gateway = test_gateway(&temp_dir);
        gateway.ingest(&lisinopril("2024-06-01")).unwrap();

        let err = gateway
            .get_medication(MedicationId::new(12345))
            .expect_err("should be missing");
        assert!(matches!(err, MedicationError::NotFound(id) if id.get() == 12345));
    }
}
