//! Parsing of inbound medication payloads.
//!
//! A payload is an untyped JSON object from an external writer. Each field is
//! checked for presence, type and format; every failure is collected and
//! reported under its field name. Only when every field parses does the
//! cross-field end-date rule run, via the same [`validate_medication`] the store
//! uses.
//!
//! Text values are trimmed before they are checked and kept. Unknown keys,
//! including any client-supplied `id`, are ignored.

use crate::constants::DATE_FORMAT;
use crate::medication::Medication;
use crate::validation::{
    check_text, validate_medication, FieldError, ValidationErrors, DATE_WRONG_FORMAT,
    FIELD_NOT_NULL, FIELD_NOT_STRING, FIELD_REQUIRED, NON_FIELD_ERRORS, NOT_AN_OBJECT,
    TEXT_FIELD_LIMITS,
};
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Validates a payload and converts it into a [`Medication`].
///
/// # Errors
///
/// Returns the structured per-field errors. When the only problem is the date
/// range, the result has exactly one entry, on `end_date`.
pub fn validate_payload(data: &Value) -> Result<Medication, ValidationErrors> {
    let Some(object) = data.as_object() else {
        return Err(FieldError::new(NON_FIELD_ERRORS, NOT_AN_OBJECT).into());
    };

    let mut errors = ValidationErrors::new();

    let mut texts: Vec<Option<String>> = Vec::with_capacity(TEXT_FIELD_LIMITS.len());
    for &(field, max_chars) in &TEXT_FIELD_LIMITS {
        let value = text_field(object, field)
            .and_then(|value| check_text(field, &value, max_chars).map(|()| value));
        match value {
            Ok(value) => texts.push(Some(value)),
            Err(e) => {
                errors.push(e);
                texts.push(None);
            }
        }
    }

    let start_date = match required_date(object, "start_date") {
        Ok(date) => Some(date),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let end_date = match optional_date(object, "end_date") {
        Ok(date) => date,
        Err(e) => {
            errors.push(e);
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut texts = texts.into_iter().flatten();
    let (Some(name), Some(dose), Some(route), Some(facility), Some(start_date)) = (
        texts.next(),
        texts.next(),
        texts.next(),
        texts.next(),
        start_date,
    ) else {
        // Every missing value above recorded an error.
        return Err(errors);
    };

    let medication = Medication {
        name,
        dose,
        route,
        start_date,
        end_date,
        facility,
    };
    validate_medication(&medication)?;

    Ok(medication)
}

fn text_field(object: &Map<String, Value>, field: &'static str) -> Result<String, FieldError> {
    match object.get(field) {
        None => Err(FieldError::new(field, FIELD_REQUIRED)),
        Some(Value::Null) => Err(FieldError::new(field, FIELD_NOT_NULL)),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(FieldError::new(field, FIELD_NOT_STRING)),
    }
}

fn required_date(object: &Map<String, Value>, field: &'static str) -> Result<NaiveDate, FieldError> {
    match object.get(field) {
        None => Err(FieldError::new(field, FIELD_REQUIRED)),
        Some(Value::Null) => Err(FieldError::new(field, FIELD_NOT_NULL)),
        Some(value) => parse_date(field, value),
    }
}

/// A missing key, `null` or an empty string all mean "no end date".
fn optional_date(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<NaiveDate>, FieldError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => parse_date(field, value).map(Some),
    }
}

/// Accepts exactly `YYYY-MM-DD`.
fn parse_date(field: &'static str, value: &Value) -> Result<NaiveDate, FieldError> {
    let wrong_format = || FieldError::new(field, DATE_WRONG_FORMAT);

    let text = value.as_str().ok_or_else(wrong_format)?.trim();
    let well_formed = text.len() == 10
        && text.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(wrong_format());
    }

    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| wrong_format())
}
