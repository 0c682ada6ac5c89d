//! Dashboard cards: latest weight and change since the previous weigh-in

use crate::storage::{Pet, PetId, WeightRecord};
use crate::views::chart::{RangeStatus, ReferenceRange};
use crate::views::history::newest_first;

/// Direction of the most recent change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Gain,
    Loss,
    Steady,
}

impl Trend {
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            Trend::Gain
        } else if delta < 0.0 {
            Trend::Loss
        } else {
            Trend::Steady
        }
    }
}

/// Latest and previous record for one pet
#[derive(Debug, Clone, PartialEq)]
pub struct LatestAndDelta<'a> {
    pub latest: Option<&'a WeightRecord>,
    pub previous: Option<&'a WeightRecord>,
    /// `latest - previous`, rounded to one decimal; `None` with fewer than
    /// two records
    pub delta: Option<f64>,
}

impl LatestAndDelta<'_> {
    pub fn trend(&self) -> Option<Trend> {
        self.delta.map(Trend::from_delta)
    }
}

/// Round to one decimal place, normalizing `-0.0` to `0.0`
pub fn round_tenth(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// `+0.5g`, `-0.5g`, `0.0g`
pub fn format_delta(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{:.1}g", delta)
    } else {
        format!("{:.1}g", delta)
    }
}

pub fn latest_and_delta<'a>(pet_id: &PetId, records: &'a [WeightRecord]) -> LatestAndDelta<'a> {
    let ordered = newest_first(records.iter().filter(|r| &r.pet_id == pet_id));
    let latest = ordered.first().copied();
    let previous = ordered.get(1).copied();
    let delta = match (latest, previous) {
        (Some(l), Some(p)) => Some(round_tenth(l.weight - p.weight)),
        _ => None,
    };

    LatestAndDelta {
        latest,
        previous,
        delta,
    }
}

/// Everything the dashboard shows for one pet
#[derive(Debug, Clone, PartialEq)]
pub struct PetCard<'a> {
    pub pet: &'a Pet,
    pub summary: LatestAndDelta<'a>,
    pub record_count: usize,
    /// Latest weight against the reference band
    pub range_status: Option<RangeStatus>,
}

/// One card per pet, in creation order
pub fn pet_cards<'a>(
    pets: &'a [Pet],
    records: &'a [WeightRecord],
    reference: &ReferenceRange,
) -> Vec<PetCard<'a>> {
    pets.iter()
        .map(|pet| {
            let summary = latest_and_delta(&pet.id, records);
            PetCard {
                pet,
                record_count: records.iter().filter(|r| r.pet_id == pet.id).count(),
                range_status: summary.latest.map(|r| reference.classify(r.weight)),
                summary,
            }
        })
        .collect()
}
