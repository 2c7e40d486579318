//! Input validation utilities.
//!
//! The rules here are pure functions with no storage access. Both the ingestion
//! gateway and the record store call them independently, so a write that skips
//! one layer still meets the other and both report the same field-scoped
//! errors with the same wording.

use crate::constants::{
    DATE_MAX_YEAR, DATE_MIN_YEAR, DOSE_MAX_CHARS, FACILITY_MAX_CHARS, NAME_MAX_CHARS,
    ROUTE_MAX_CHARS,
};
use crate::medication::Medication;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Message reported on `end_date` when it falls before `start_date`.
pub const END_DATE_BEFORE_START: &str = "End date cannot be before start date.";
pub const FIELD_REQUIRED: &str = "This field is required.";
pub const FIELD_NOT_NULL: &str = "This field may not be null.";
pub const FIELD_NOT_BLANK: &str = "This field may not be blank.";
pub const FIELD_NOT_STRING: &str = "Not a valid string.";
pub const DATE_WRONG_FORMAT: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
pub const DATE_OUT_OF_RANGE: &str = "Date must fall between the years 0000 and 9999.";
pub const NOT_AN_OBJECT: &str = "Invalid data. Expected a dictionary.";

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Text fields with their maximum length in characters.
pub const TEXT_FIELD_LIMITS: [(&str, usize); 4] = [
    ("name", NAME_MAX_CHARS),
    ("dose", DOSE_MAX_CHARS),
    ("route", ROUTE_MAX_CHARS),
    ("facility", FACILITY_MAX_CHARS),
];

/// A single failed rule on a single field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Field-scoped validation failures, keyed by field name.
///
/// Serialises as a JSON object mapping each field to its list of messages,
/// for example `{"end_date": ["End date cannot be before start date."]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0
            .entry(error.field.to_string())
            .or_default()
            .push(error.message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded against `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Field names with at least one error, in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        let mut errors = Self::new();
        errors.push(error);
        errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Checks a required text value against the blank and length rules.
///
/// Length is counted in characters, not bytes.
pub fn check_text(field: &'static str, value: &str, max_chars: usize) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, FIELD_NOT_BLANK));
    }

    if value.chars().count() > max_chars {
        return Err(FieldError::new(
            field,
            format!("Ensure this field has no more than {max_chars} characters."),
        ));
    }

    Ok(())
}

/// Dates are stored as `YYYY-MM-DD` text, so the year must fit in four digits.
pub fn check_date_year(field: &'static str, date: NaiveDate) -> Result<(), FieldError> {
    if (DATE_MIN_YEAR..=DATE_MAX_YEAR).contains(&date.year()) {
        Ok(())
    } else {
        Err(FieldError::new(field, DATE_OUT_OF_RANGE))
    }
}

/// The end-date rule: when present, `end_date` must not precede `start_date`.
///
/// Equal dates are accepted (a single-day course).
pub fn check_date_range(start_date: NaiveDate, end_date: Option<NaiveDate>) -> Result<(), FieldError> {
    match end_date {
        Some(end) if end < start_date => Err(FieldError::new("end_date", END_DATE_BEFORE_START)),
        _ => Ok(()),
    }
}

/// Full-entity validation of a medication.
///
/// Every text field is checked, then each date's year, then the date range.
/// All failures are collected rather than stopping at the first.
pub fn validate_medication(medication: &Medication) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let values = [
        medication.name.as_str(),
        medication.dose.as_str(),
        medication.route.as_str(),
        medication.facility.as_str(),
    ];
    for (&(field, max_chars), value) in TEXT_FIELD_LIMITS.iter().zip(values) {
        if let Err(e) = check_text(field, value, max_chars) {
            errors.push(e);
        }
    }

    let dates = [
        ("start_date", Some(medication.start_date)),
        ("end_date", medication.end_date),
    ];
    for (field, date) in dates {
        if let Some(Err(e)) = date.map(|date| check_date_year(field, date)) {
            errors.push(e);
        }
    }

    if let Err(e) = check_date_range(medication.start_date, medication.end_date) {
        errors.push(e);
    }

    errors.into_result()
}
