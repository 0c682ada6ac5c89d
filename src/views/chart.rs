//! Chart series
//!
//! Aligns weights from all pets on a shared date axis. Each row is one
//! distinct date; a pet only has a value in rows where it has a record, so
//! renderers must treat a missing value as "no point", never as zero.

use crate::storage::{Pet, PetId, WeightRecord};
use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Padding applied above and below the plotted values, in grams
pub const DOMAIN_PADDING: f64 = 5.0;

/// One point on the date axis
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub date: NaiveDate,
    /// Weight per pet; absent when the pet has no record that day
    pub values: BTreeMap<PetId, f64>,
}

impl ChartRow {
    pub fn value(&self, pet_id: &PetId) -> Option<f64> {
        self.values.get(pet_id).copied()
    }
}

// Flat shape: {"date": "2023-10-01", "p1": 32, "p2": 38}
impl Serialize for ChartRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("date", &self.date)?;
        for (pet_id, weight) in &self.values {
            map.serialize_entry(pet_id.as_str(), weight)?;
        }
        map.end()
    }
}

/// Build the date-aligned series.
///
/// When several records share a (pet, date), the one with the greatest sort
/// timestamp wins; on equal timestamps the later-inserted record wins.
/// Dates from records of unknown pets still produce a (possibly empty) row.
pub fn build_chart_series(pets: &[Pet], records: &[WeightRecord]) -> Vec<ChartRow> {
    let dates: BTreeSet<NaiveDate> = records.iter().map(|r| r.date).collect();

    let mut latest: HashMap<(&PetId, NaiveDate), &WeightRecord> = HashMap::new();
    for record in records {
        latest
            .entry((&record.pet_id, record.date))
            .and_modify(|current| {
                if record.timestamp >= current.timestamp {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    dates
        .into_iter()
        .map(|date| {
            let values = pets
                .iter()
                .filter_map(|pet| {
                    latest
                        .get(&(&pet.id, date))
                        .map(|r| (pet.id.clone(), r.weight))
                })
                .collect();
            ChartRow { date, values }
        })
        .collect()
}

/// Y-axis domain: lowest value minus padding to highest value plus padding
pub fn value_domain(rows: &[ChartRow]) -> Option<(f64, f64)> {
    let mut values = rows.iter().flat_map(|r| r.values.values().copied());
    let first = values.next()?;
    let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    Some((min - DOMAIN_PADDING, max + DOMAIN_PADDING))
}

/// Where a weight sits relative to the reference band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStatus {
    Below,
    Within,
    Above,
}

/// Healthy-weight reference band drawn on charts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ReferenceRange {
    fn default() -> Self {
        // Typical adult budgerigar
        Self {
            min: 30.0,
            max: 40.0,
        }
    }
}

impl ReferenceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn classify(&self, weight: f64) -> RangeStatus {
        if weight < self.min {
            RangeStatus::Below
        } else if weight > self.max {
            RangeStatus::Above
        } else {
            RangeStatus::Within
        }
    }
}
