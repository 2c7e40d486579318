//! The medication entity.
//!
//! A [`Medication`] is the set of values describing one prescribed course; a
//! [`MedicationRecord`] is a medication that the store has persisted and
//! assigned an id to. The two are kept apart so that an id can only come from
//! the store.

use crate::validation::{self, ValidationErrors};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Store-assigned identifier for a medication record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MedicationId(i64);

impl MedicationId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MedicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MedicationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

/// Values of a single medication course.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Medication {
    pub name: String,
    pub dose: String,
    /// Administration route (oral, intravenous, ...).
    pub route: String,
    pub start_date: NaiveDate,
    /// `None` means ongoing or unknown.
    pub end_date: Option<NaiveDate>,
    pub facility: String,
}

impl Medication {
    /// Runs the full-entity checks shared by the gateway and the store.
    ///
    /// # Errors
    ///
    /// Returns every failing field, keyed by field name.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validation::validate_medication(self)
    }
}

impl fmt::Display for Medication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.dose)
    }
}

/// A medication as persisted by the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MedicationRecord {
    pub id: MedicationId,
    pub medication: Medication,
}

impl fmt::Display for MedicationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.medication)
    }
}
