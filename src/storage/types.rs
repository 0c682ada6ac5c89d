//! Core data types for the weight log
//!
//! This module defines the two persisted record types and their helpers:
//! - `Pet`: a tracked bird with a display colour
//! - `WeightRecord`: one dated weight observation in grams
//! - `PetId` / `RecordId`: opaque identifiers
//! - `PALETTE`: chart colours assigned by creation order

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Species used when the form leaves it blank
pub const DEFAULT_SPECIES: &str = "Budgerigar";

/// Chart colours, assigned cyclically by pet creation order
pub const PALETTE: [&str; 7] = [
    "#84cc16", // lime
    "#0ea5e9", // sky
    "#eab308", // yellow
    "#a855f7", // purple
    "#64748b", // slate
    "#14b8a6", // teal
    "#f43f5e", // rose
];

/// Colour for the pet created at position `index` (0-based)
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Opaque pet identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PetId(String);

/// Opaque weight record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

macro_rules! opaque_id {
    ($name:ident) => {
        impl $name {
            /// Generate a fresh random identifier
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().simple().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(PetId);
opaque_id!(RecordId);

/// A tracked bird
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// Assigned at creation, never changes
    pub id: PetId,
    /// Display name (non-empty)
    pub name: String,
    /// Species label, e.g. "Budgerigar"
    pub species: String,
    /// Hex colour from `PALETTE`, fixed at creation
    pub color: String,
    /// Unix timestamp in milliseconds (informational only)
    pub created_at: i64,
}

impl Pet {
    /// Create a pet; `position` is the number of pets that already exist
    pub fn new(name: impl Into<String>, species: impl Into<String>, position: usize) -> Self {
        Self {
            id: PetId::generate(),
            name: name.into(),
            species: species.into(),
            color: palette_color(position).to_string(),
            created_at: Utc::now().timestamp_millis(),
        }
    }
}

/// A single dated weight observation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecord {
    pub id: RecordId,
    /// Owning pet; may dangle if the pet was removed without cascading
    pub pet_id: PetId,
    /// Weight in grams
    pub weight: f64,
    /// Calendar date, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Sort key derived from `date` (Unix millis at 00:00 UTC)
    pub timestamp: i64,
}

impl WeightRecord {
    pub fn new(pet_id: PetId, weight: f64, date: NaiveDate, notes: Option<String>) -> Self {
        Self {
            id: RecordId::generate(),
            pet_id,
            weight,
            date,
            notes,
            timestamp: sort_timestamp(date),
        }
    }

    /// Builder: set a specific id (seed data, tests)
    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = id.into();
        self
    }
}

/// Sort timestamp for a calendar date: milliseconds at midnight UTC
pub fn sort_timestamp(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::default())
        .and_utc()
        .timestamp_millis()
}

/// Current calendar date (UTC)
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Format a weight for display: `32g`, `32.5g`
pub fn format_grams(weight: f64) -> String {
    format!("{}g", weight)
}

/// Short human-readable date: `Sun, Oct 1`
pub fn format_date_display(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(palette_color(0), "#84cc16");
        assert_eq!(palette_color(6), "#f43f5e");
        assert_eq!(palette_color(7), "#84cc16");
        assert_eq!(palette_color(15), PALETTE[1]);
    }

    #[test]
    fn test_sort_timestamp_is_utc_midnight() {
        assert_eq!(sort_timestamp(date("2023-10-01")), 1_696_118_400_000);
        assert_eq!(sort_timestamp(date("2023-10-15")), 1_697_328_000_000);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = PetId::generate();
        let b = PetId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn test_record_serialization_shape() {
        let record = WeightRecord::new(PetId::from("p1"), 32.5, date("2023-10-15"), None)
            .with_id("l3");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "l3",
                "petId": "p1",
                "weight": 32.5,
                "date": "2023-10-15",
                "timestamp": 1_697_328_000_000_i64,
            })
        );
    }

    #[test]
    fn test_pet_serialization_roundtrip() {
        let pet = Pet::new("Kiwi", DEFAULT_SPECIES, 3);
        let json = serde_json::to_string(&pet).unwrap();
        assert!(json.contains("\"createdAt\""));

        let restored: Pet = serde_json::from_str(&json).unwrap();
        assert_eq!(pet, restored);
        assert_eq!(restored.color, PALETTE[3]);
    }

    #[test]
    fn test_display_helpers() {
        assert_eq!(format_grams(32.0), "32g");
        assert_eq!(format_grams(32.5), "32.5g");
        assert_eq!(format_date_display(date("2023-10-01")), "Sun, Oct 1");
    }
}
