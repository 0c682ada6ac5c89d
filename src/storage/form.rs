//! Form input and validation
//!
//! Forms carry user input as entered (text). `validate()` turns them into
//! typed values or a `ValidationError`; the store only ever sees validated
//! input.

use crate::storage::error::ValidationError;
use crate::storage::types::DEFAULT_SPECIES;
use chrono::NaiveDate;

/// Pet add/edit form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetForm {
    pub name: String,
    pub species: String,
}

/// Validated pet fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPet {
    pub name: String,
    pub species: String,
}

impl PetForm {
    pub fn new(name: impl Into<String>, species: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            species: species.into(),
        }
    }

    pub fn validate(&self) -> Result<ValidPet, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let species = match self.species.trim() {
            "" => DEFAULT_SPECIES,
            s => s,
        };

        Ok(ValidPet {
            name: name.to_string(),
            species: species.to_string(),
        })
    }
}

/// Weight record add/edit form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordForm {
    /// Ignored when editing an existing record
    pub pet_id: String,
    pub weight: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub notes: String,
}

/// Validated record fields
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRecord {
    pub weight: f64,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl RecordForm {
    pub fn new(
        pet_id: impl Into<String>,
        weight: impl Into<String>,
        date: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            pet_id: pet_id.into(),
            weight: weight.into(),
            date: date.into(),
            notes: notes.into(),
        }
    }

    /// Validate everything except the pet reference
    pub fn validate(&self) -> Result<ValidRecord, ValidationError> {
        let weight = parse_weight(&self.weight)?;
        let date = parse_date(&self.date)?;
        let notes = match self.notes.trim() {
            "" => None,
            n => Some(n.to_string()),
        };

        Ok(ValidRecord {
            weight,
            date,
            notes,
        })
    }

    /// Validate including the pet reference (new records)
    pub fn validate_new(&self) -> Result<(String, ValidRecord), ValidationError> {
        let pet_id = self.pet_id.trim();
        if pet_id.is_empty() {
            return Err(ValidationError::MissingPet);
        }
        Ok((pet_id.to_string(), self.validate()?))
    }
}

/// Parse a weight in grams; must be a finite positive number
pub fn parse_weight(input: &str) -> Result<f64, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::MissingWeight);
    }

    match input.parse::<f64>() {
        Ok(w) if w.is_finite() && w > 0.0 => Ok(w),
        _ => Err(ValidationError::InvalidWeight(input.to_string())),
    }
}

/// Parse an ISO calendar date (`YYYY-MM-DD`)
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::MissingDate);
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}
