//! Budgie Fit Storage
//!
//! This module owns the persisted state:
//!
//! - **types**: Core data structures (Pet, WeightRecord, identifiers, palette)
//! - **form**: Text form input and validation
//! - **kv**: Key-value persistence backends (files, memory)
//! - **seed**: Demo data used when nothing is persisted
//! - **store**: The state container that ties them together
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   Form → validate → Store mutation → serialize both collections → KeyValueStore → notify
//!
//! Load Path:
//!   KeyValueStore → parse each collection → (seed on absence/failure) → Store
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use budgie_fit::storage::{FileStore, PetForm, RecordForm, Store};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = Store::load(FileStore::new("./budgie_data"));
//!
//!     let kiwi = store.add_pet(&PetForm::new("Kiwi", "Budgerigar"))?.id.clone();
//!     store.add_weight_record(&RecordForm::new(kiwi.as_str(), "34.5", "2024-03-01", ""))?;
//!
//!     println!("{} records", store.records().len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod form;
pub mod kv;
pub mod seed;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{StorageError, StorageResult, StoreError, StoreResult, ValidationError};
pub use form::{parse_date, parse_weight, PetForm, RecordForm, ValidPet, ValidRecord};
pub use kv::{FileStore, KeyValueStore, MemoryStore, PETS_KEY, RECORDS_KEY};
pub use seed::{seed_pets, seed_records};
pub use store::{Change, DeletedPet, Store, SubscriptionId, UNKNOWN_PET};
pub use types::{
    format_date_display, format_grams, palette_color, sort_timestamp, today, Pet, PetId, RecordId,
    WeightRecord, DEFAULT_SPECIES, PALETTE,
};
