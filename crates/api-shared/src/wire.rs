//! Wire models for the medication catalog.
//!
//! These are the JSON shapes returned over HTTP and printed by the CLI. Field
//! order and names are part of the external contract:
//! `{id, name, dose, route, start_date, end_date, facility}`.
//!
//! Dates serialise as `YYYY-MM-DD`; an absent end date serialises as `null`
//! rather than being omitted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single medication record as it appears on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MedicationRes {
    /// Store-assigned identifier.
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Lisinopril")]
    pub name: String,
    #[schema(example = "10mg")]
    pub dose: String,
    /// Administration route.
    #[schema(example = "oral")]
    pub route: String,
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub start_date: NaiveDate,
    /// `null` means ongoing or unknown.
    #[schema(value_type = Option<String>, format = Date, example = "2024-06-01")]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "Clinic A")]
    pub facility: String,
}

/// Health check response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// API root listing the browsable collections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiRootRes {
    #[schema(example = "/medications/")]
    pub medications: String,
}

/// Error body for non-validation failures (`404`, `500`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    #[schema(example = "Not found.")]
    pub detail: String,
}

impl ErrorRes {
    pub fn not_found() -> Self {
        Self {
            detail: "Not found.".into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            detail: "Internal error".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lisinopril(end_date: Option<NaiveDate>) -> MedicationRes {
        MedicationRes {
            id: 7,
            name: "Lisinopril".into(),
            dose: "10mg".into(),
            route: "oral".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date,
            facility: "Clinic A".into(),
        }
    }

    #[test]
    fn test_medication_serialises_dates_as_iso_strings() {
        let res = lisinopril(NaiveDate::from_ymd_opt(2024, 6, 1));
        let value = serde_json::to_value(&res).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "name": "Lisinopril",
                "dose": "10mg",
                "route": "oral",
                "start_date": "2024-01-01",
                "end_date": "2024-06-01",
                "facility": "Clinic A",
            })
        );
    }

    #[test]
    fn test_medication_serialises_absent_end_date_as_null() {
        let value = serde_json::to_value(lisinopril(None)).unwrap();
        let obj = value.as_object().expect("object");
        assert!(obj.contains_key("end_date"), "end_date must not be omitted");
        assert!(obj["end_date"].is_null());
    }

    #[test]
    fn test_medication_field_order_matches_contract() {
        let text = serde_json::to_string(&lisinopril(None)).unwrap();
        let keys = [
            "\"id\"",
            "\"name\"",
            "\"dose\"",
            "\"route\"",
            "\"start_date\"",
            "\"end_date\"",
            "\"facility\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| text.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
    }
}
