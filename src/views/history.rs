//! History table rows
//!
//! Records newest first, optionally filtered to one pet. Records sharing a
//! sort timestamp are ordered by insertion, later-inserted first, so the
//! first row for a pet is always the entry the chart treats as authoritative.

use crate::storage::{Pet, WeightRecord, UNKNOWN_PET};
use crate::views::state::PetFilter;

/// One labelled row of the history table
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow<'a> {
    pub record: &'a WeightRecord,
    /// Owning pet's name, or `"unknown"` if it no longer exists
    pub pet_name: &'a str,
    pub pet_color: Option<&'a str>,
}

/// Order records newest first (sort timestamp descending, then later
/// position in `records` first)
pub fn newest_first<'a, I>(records: I) -> Vec<&'a WeightRecord>
where
    I: IntoIterator<Item = &'a WeightRecord>,
{
    let mut indexed: Vec<(usize, &WeightRecord)> = records.into_iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| b.timestamp.cmp(&a.timestamp).then(ib.cmp(ia)));
    indexed.into_iter().map(|(_, r)| r).collect()
}

/// Records matching `filter`, newest first
pub fn build_history_rows<'a>(
    records: &'a [WeightRecord],
    filter: &PetFilter,
) -> Vec<&'a WeightRecord> {
    newest_first(records.iter().filter(|r| filter.matches(&r.pet_id)))
}

/// History rows with pet labels attached
pub fn history_table<'a>(
    pets: &'a [Pet],
    records: &'a [WeightRecord],
    filter: &PetFilter,
) -> Vec<HistoryRow<'a>> {
    build_history_rows(records, filter)
        .into_iter()
        .map(|record| {
            let pet = pets.iter().find(|p| p.id == record.pet_id);
            HistoryRow {
                record,
                pet_name: pet.map(|p| p.name.as_str()).unwrap_or(UNKNOWN_PET),
                pet_color: pet.map(|p| p.color.as_str()),
            }
        })
        .collect()
}
