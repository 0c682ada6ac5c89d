//! The pet/record store
//!
//! `Store` is the single owner of both collections. Every successful
//! mutation rewrites both collections to the key-value backend and then
//! notifies subscribers; rejected mutations change nothing.
//!
//! All operations run to completion on the caller's thread. There is no
//! background work and no locking.

use crate::storage::error::{StorageError, StoreError, StoreResult};
use crate::storage::form::{PetForm, RecordForm};
use crate::storage::kv::{KeyValueStore, PETS_KEY, RECORDS_KEY};
use crate::storage::seed::{seed_pets, seed_records};
use crate::storage::types::{sort_timestamp, Pet, PetId, RecordId, WeightRecord};
use serde::de::DeserializeOwned;

/// Label shown for a record whose pet no longer exists
pub const UNKNOWN_PET: &str = "unknown";

/// A committed mutation, delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    PetAdded(PetId),
    PetUpdated(PetId),
    PetDeleted { id: PetId, removed_records: usize },
    RecordAdded(RecordId),
    RecordUpdated(RecordId),
    RecordDeleted(RecordId),
}

/// Handle returned by `Store::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Result of a cascading pet deletion
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedPet {
    pub pet: Pet,
    pub removed_records: usize,
}

type Listener = Box<dyn FnMut(&Change)>;

/// State container for pets and weight records
pub struct Store<K: KeyValueStore> {
    kv: K,
    pets: Vec<Pet>,
    records: Vec<WeightRecord>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<K: KeyValueStore> Store<K> {
    /// Hydrate from `kv`, substituting seed data for any collection that is
    /// absent or unreadable. Never fails.
    pub fn load(kv: K) -> Self {
        let pets = load_collection(&kv, PETS_KEY, seed_pets);
        let records = load_collection(&kv, RECORDS_KEY, seed_records);

        tracing::info!(pets = pets.len(), records = records.len(), "Store loaded");

        Self {
            kv,
            pets,
            records,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Create a store with explicit contents (nothing is read from `kv`)
    pub fn with_data(kv: K, pets: Vec<Pet>, records: Vec<WeightRecord>) -> Self {
        Self {
            kv,
            pets,
            records,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn pets(&self) -> &[Pet] {
        &self.pets
    }

    pub fn records(&self) -> &[WeightRecord] {
        &self.records
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn pet(&self, id: &PetId) -> Option<&Pet> {
        self.pets.iter().find(|p| &p.id == id)
    }

    pub fn record(&self, id: &RecordId) -> Option<&WeightRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Pet name, or `"unknown"` for a dangling reference
    pub fn pet_name_or_unknown(&self, id: &PetId) -> &str {
        self.pet(id).map(|p| p.name.as_str()).unwrap_or(UNKNOWN_PET)
    }

    /// Resolve a user-supplied pet reference: exact id first, then name
    /// (case-insensitive)
    pub fn find_pet(&self, query: &str) -> Option<&Pet> {
        let query = query.trim();
        self.pets
            .iter()
            .find(|p| p.id.as_str() == query)
            .or_else(|| {
                let lower = query.to_lowercase();
                self.pets.iter().find(|p| p.name.to_lowercase() == lower)
            })
    }

    /// Register a change listener
    pub fn subscribe(&mut self, listener: impl FnMut(&Change) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Add a pet. The colour is taken from the palette by current pet count.
    pub fn add_pet(&mut self, form: &PetForm) -> StoreResult<&Pet> {
        let valid = form.validate()?;
        let pet = Pet::new(valid.name, valid.species, self.pets.len());
        let id = pet.id.clone();

        tracing::info!(pet_id = %id, name = %pet.name, color = %pet.color, "Pet added");
        self.pets.push(pet);
        self.commit(Change::PetAdded(id))?;

        let idx = self.pets.len() - 1;
        Ok(&self.pets[idx])
    }

    /// Replace name and species; colour and creation time are kept
    pub fn update_pet(&mut self, id: &PetId, form: &PetForm) -> StoreResult<&Pet> {
        let valid = form.validate()?;
        let idx = self
            .pets
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| StoreError::PetNotFound(id.to_string()))?;

        let pet = &mut self.pets[idx];
        pet.name = valid.name;
        pet.species = valid.species;

        tracing::info!(pet_id = %id, "Pet updated");
        self.commit(Change::PetUpdated(id.clone()))?;
        Ok(&self.pets[idx])
    }

    /// Remove a pet and every record that references it
    pub fn delete_pet(&mut self, id: &PetId) -> StoreResult<DeletedPet> {
        let idx = self
            .pets
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| StoreError::PetNotFound(id.to_string()))?;

        let pet = self.pets.remove(idx);
        let before = self.records.len();
        self.records.retain(|r| &r.pet_id != id);
        let removed_records = before - self.records.len();

        tracing::info!(pet_id = %id, removed_records, "Pet deleted");
        self.commit(Change::PetDeleted {
            id: id.clone(),
            removed_records,
        })?;

        Ok(DeletedPet {
            pet,
            removed_records,
        })
    }

    /// Add a weight record for an existing pet
    pub fn add_weight_record(&mut self, form: &RecordForm) -> StoreResult<&WeightRecord> {
        let (pet_id, valid) = form.validate_new()?;
        let pet_id = PetId::from(pet_id);
        if self.pet(&pet_id).is_none() {
            return Err(StoreError::PetNotFound(pet_id.to_string()));
        }

        let record = WeightRecord::new(pet_id, valid.weight, valid.date, valid.notes);
        let id = record.id.clone();

        tracing::info!(
            record_id = %id,
            pet_id = %record.pet_id,
            weight = record.weight,
            date = %record.date,
            "Weight recorded"
        );
        self.records.push(record);
        self.commit(Change::RecordAdded(id))?;

        let idx = self.records.len() - 1;
        Ok(&self.records[idx])
    }

    /// Replace weight, date and notes of a record; the owning pet is kept
    pub fn update_weight_record(
        &mut self,
        id: &RecordId,
        form: &RecordForm,
    ) -> StoreResult<&WeightRecord> {
        let valid = form.validate()?;
        let idx = self
            .records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| StoreError::RecordNotFound(id.to_string()))?;

        let record = &mut self.records[idx];
        record.weight = valid.weight;
        record.date = valid.date;
        record.notes = valid.notes;
        record.timestamp = sort_timestamp(valid.date);

        tracing::info!(record_id = %id, "Weight record updated");
        self.commit(Change::RecordUpdated(id.clone()))?;
        Ok(&self.records[idx])
    }

    pub fn delete_weight_record(&mut self, id: &RecordId) -> StoreResult<WeightRecord> {
        let idx = self
            .records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| StoreError::RecordNotFound(id.to_string()))?;

        let record = self.records.remove(idx);

        tracing::info!(record_id = %id, "Weight record deleted");
        self.commit(Change::RecordDeleted(id.clone()))?;
        Ok(record)
    }

    /// Persist both collections, then notify. Listeners see the change even
    /// when the write fails, since memory already reflects it.
    fn commit(&mut self, change: Change) -> StoreResult<()> {
        let result = self.persist();
        if let Err(e) = &result {
            tracing::error!(error = %e, "Failed to persist store");
        }

        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }

        result
    }

    fn persist(&mut self) -> StoreResult<()> {
        let pets = serde_json::to_string(&self.pets).map_err(StorageError::from)?;
        let records = serde_json::to_string(&self.records).map_err(StorageError::from)?;
        self.kv.set(PETS_KEY, &pets)?;
        self.kv.set(RECORDS_KEY, &records)?;
        Ok(())
    }
}

fn load_collection<K, T>(kv: &K, key: &str, seed: fn() -> Vec<T>) -> Vec<T>
where
    K: KeyValueStore,
    T: DeserializeOwned,
{
    match kv.get(key) {
        Ok(Some(content)) => match serde_json::from_str(&content) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(key, error = %e, "Persisted data unreadable, using seed data");
                seed()
            }
        },
        Ok(None) => {
            tracing::info!(key, "Nothing persisted yet, using seed data");
            seed()
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read persisted data, using seed data");
            seed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::error::ValidationError;
    use crate::storage::kv::{FileStore, MemoryStore};
    use crate::storage::types::PALETTE;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    fn empty_store() -> Store<MemoryStore> {
        Store::with_data(MemoryStore::new(), Vec::new(), Vec::new())
    }

    fn seeded_store() -> Store<MemoryStore> {
        Store::load(MemoryStore::new())
    }

    fn record_form(pet: &str, weight: &str, date: &str) -> RecordForm {
        RecordForm::new(pet, weight, date, "")
    }

    /// Backend whose writes always fail
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> crate::storage::StorageResult<Option<String>> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> crate::storage::StorageResult<()> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn test_load_uses_seed_when_absent() {
        let store = seeded_store();
        assert_eq!(store.pets().len(), 2);
        assert_eq!(store.records().len(), 5);
    }

    #[test]
    fn test_load_falls_back_per_collection() {
        let kv = MemoryStore::new()
            .with_entry(PETS_KEY, "not json")
            .with_entry(RECORDS_KEY, "[]");
        let store = Store::load(kv);

        assert_eq!(store.pets().len(), 2);
        assert!(store.records().is_empty());
    }

    #[test]
    fn test_palette_cycles_by_creation_order() {
        let mut store = empty_store();
        for i in 0..10 {
            let pet = store.add_pet(&PetForm::new(format!("Bird {}", i), "")).unwrap();
            assert_eq!(pet.color, PALETTE[i % PALETTE.len()]);
        }
    }

    #[test]
    fn test_add_pet_rejects_blank_name() {
        let mut store = empty_store();
        let err = store.add_pet(&PetForm::new("  ", "")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::EmptyName)));
        assert!(store.pets().is_empty());
        assert_eq!(store.kv().get(PETS_KEY).unwrap(), None);
    }

    #[test]
    fn test_update_pet_keeps_color_and_created_at() {
        let mut store = seeded_store();
        let original = store.pets()[1].clone();

        let updated = store
            .update_pet(&original.id, &PetForm::new("Sky", "Lovebird"))
            .unwrap();
        assert_eq!(updated.name, "Sky");
        assert_eq!(updated.species, "Lovebird");
        assert_eq!(updated.color, original.color);
        assert_eq!(updated.created_at, original.created_at);

        let missing = store.update_pet(&PetId::from("nope"), &PetForm::new("X", ""));
        assert!(matches!(missing, Err(StoreError::PetNotFound(_))));

        let blank = store.update_pet(&original.id, &PetForm::new("", ""));
        assert!(matches!(blank, Err(StoreError::Validation(_))));
        assert_eq!(store.pet(&original.id).unwrap().name, "Sky");
    }

    #[test]
    fn test_delete_pet_cascades_exactly() {
        let mut store = seeded_store();
        let p1 = PetId::from("p1");
        let before = store.records().len();
        let owned = store.records().iter().filter(|r| r.pet_id == p1).count();

        let deleted = store.delete_pet(&p1).unwrap();

        assert_eq!(deleted.pet.name, "Pippi");
        assert_eq!(deleted.removed_records, owned);
        assert_eq!(store.records().len(), before - owned);
        assert!(store.records().iter().all(|r| r.pet_id != p1));
        assert_eq!(store.pets().len(), 1);
    }

    #[test]
    fn test_add_record_validation_is_noop() {
        let mut store = seeded_store();
        let before = store.records().len();

        assert!(store.add_weight_record(&record_form("p1", "", "2023-11-01")).is_err());
        assert!(store.add_weight_record(&record_form("p1", "33", "")).is_err());
        assert!(store.add_weight_record(&record_form("p1", "abc", "2023-11-01")).is_err());
        assert!(store.add_weight_record(&record_form("", "33", "2023-11-01")).is_err());
        assert!(matches!(
            store.add_weight_record(&record_form("ghost", "33", "2023-11-01")),
            Err(StoreError::PetNotFound(_))
        ));

        assert_eq!(store.records().len(), before);
        assert_eq!(store.kv().get(RECORDS_KEY).unwrap(), None);
    }

    #[test]
    fn test_add_and_update_record() {
        let mut store = seeded_store();
        let id = store
            .add_weight_record(&RecordForm::new("p2", "36.5", "2023-10-15", "molting"))
            .unwrap()
            .id
            .clone();

        let record = store.record(&id).unwrap();
        assert_eq!(record.weight, 36.5);
        assert_eq!(record.timestamp, 1_697_328_000_000);
        assert_eq!(record.notes.as_deref(), Some("molting"));

        // Pet reference on the form is ignored when editing
        let updated = store
            .update_weight_record(&id, &RecordForm::new("p1", "36", "2023-10-16", ""))
            .unwrap();
        assert_eq!(updated.pet_id, PetId::from("p2"));
        assert_eq!(updated.weight, 36.0);
        assert_eq!(updated.timestamp, 1_697_414_400_000);
        assert_eq!(updated.notes, None);

        let missing =
            store.update_weight_record(&RecordId::from("x"), &record_form("", "1", "2023-01-01"));
        assert!(matches!(missing, Err(StoreError::RecordNotFound(_))));
    }

    #[test]
    fn test_delete_record() {
        let mut store = seeded_store();
        let removed = store.delete_weight_record(&RecordId::from("l2")).unwrap();
        assert_eq!(removed.weight, 33.0);
        assert_eq!(store.records().len(), 4);
        assert!(store.delete_weight_record(&RecordId::from("l2")).is_err());
    }

    #[test]
    fn test_persist_and_reload_roundtrip() {
        let dir = tempdir().unwrap();
        let mut store = Store::load(FileStore::new(dir.path()));
        store.add_pet(&PetForm::new("Kiwi", "Cockatiel")).unwrap();
        let kiwi = store.pets()[2].id.to_string();
        store
            .add_weight_record(&RecordForm::new(kiwi, "88.2", "2024-02-29", "vet visit"))
            .unwrap();

        let reloaded = Store::load(FileStore::new(dir.path()));
        assert_eq!(reloaded.pets(), store.pets());
        assert_eq!(reloaded.records(), store.records());
    }

    #[test]
    fn test_subscribers_see_committed_changes() {
        let mut store = seeded_store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = store.subscribe(move |change| sink.borrow_mut().push(change.clone()));

        store.delete_pet(&PetId::from("p2")).unwrap();
        let _ = store.add_pet(&PetForm::new("", ""));

        assert_eq!(
            *seen.borrow(),
            vec![Change::PetDeleted {
                id: PetId::from("p2"),
                removed_records: 2
            }]
        );

        assert!(store.unsubscribe(sub));
        store.delete_weight_record(&RecordId::from("l1")).unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_failed_persist_keeps_change_and_notifies() {
        let mut store = Store::with_data(ReadOnlyStore, Vec::new(), Vec::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |change| sink.borrow_mut().push(change.clone()));

        let err = store.add_pet(&PetForm::new("Kiwi", "")).unwrap_err();
        assert!(matches!(err, StoreError::Storage(StorageError::Io(_))));

        assert_eq!(store.pets().len(), 1);
        let id = store.pets()[0].id.clone();
        assert_eq!(store.pets()[0].name, "Kiwi");
        assert_eq!(*seen.borrow(), vec![Change::PetAdded(id)]);
    }

    #[test]
    fn test_lookup_helpers() {
        let mut store = seeded_store();
        assert_eq!(store.find_pet("p2").unwrap().name, "Blue");
        assert_eq!(store.find_pet("pippi").unwrap().id, PetId::from("p1"));
        assert!(store.find_pet("nobody").is_none());

        store.pets.retain(|p| p.id.as_str() != "p1");
        assert_eq!(store.pet_name_or_unknown(&PetId::from("p1")), UNKNOWN_PET);
        assert_eq!(store.pet_name_or_unknown(&PetId::from("p2")), "Blue");
    }
}
