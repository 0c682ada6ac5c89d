//! Demo data used when nothing usable has been persisted yet

use crate::storage::types::{palette_color, Pet, PetId, WeightRecord, DEFAULT_SPECIES};
use chrono::{NaiveDate, Utc};

/// Seed pets: two budgies
pub fn seed_pets() -> Vec<Pet> {
    let now = Utc::now().timestamp_millis();
    [("p1", "Pippi"), ("p2", "Blue")]
        .into_iter()
        .enumerate()
        .map(|(position, (id, name))| Pet {
            id: PetId::from(id),
            name: name.to_string(),
            species: DEFAULT_SPECIES.to_string(),
            color: palette_color(position).to_string(),
            created_at: now,
        })
        .collect()
}

/// Seed weight records for the seed pets
pub fn seed_records() -> Vec<WeightRecord> {
    [
        ("l1", "p1", 32.0, (2023, 10, 1)),
        ("l2", "p1", 33.0, (2023, 10, 8)),
        ("l3", "p1", 32.5, (2023, 10, 15)),
        ("l4", "p2", 38.0, (2023, 10, 1)),
        ("l5", "p2", 37.0, (2023, 10, 8)),
    ]
    .into_iter()
    .filter_map(|(id, pet, weight, (y, m, d))| {
        let date = NaiveDate::from_ymd_opt(y, m, d)?;
        Some(WeightRecord::new(PetId::from(pet), weight, date, None).with_id(id))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_records_reference_seed_pets() {
        let pets = seed_pets();
        let records = seed_records();

        assert_eq!(pets.len(), 2);
        assert_eq!(records.len(), 5);
        assert!(records
            .iter()
            .all(|r| pets.iter().any(|p| p.id == r.pet_id)));
    }

    #[test]
    fn test_seed_timestamps_match_dates() {
        let records = seed_records();
        assert_eq!(records[0].timestamp, 1_696_118_400_000);
        assert_eq!(records[1].timestamp, 1_696_723_200_000);
        assert_eq!(records[2].timestamp, 1_697_328_000_000);
    }
}
