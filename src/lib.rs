//! # Budgie Fit
//!
//! Weight tracking for pet birds. Keep a list of birds, log their weight
//! over time, see trends and export everything to a spreadsheet.
//!
//! ## Features
//!
//! - **Durable state**: pets and weight records persisted as JSON documents
//! - **Demo data**: a first run starts with two sample birds
//! - **Views**: dashboard cards, newest-first history, date-aligned chart series
//! - **Export**: `.xlsx` workbook with a summary sheet and one sheet per bird
//!
//! ## Modules
//!
//! - [`storage`]: Data model, validation, persistence and the state container
//! - [`views`]: Derived view data and transient view state
//! - [`export`]: Spreadsheet export
//! - [`config`]: Configuration loading
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use budgie_fit::storage::{FileStore, RecordForm, Store};
//! use budgie_fit::views::{pet_cards, ReferenceRange};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = Store::load(FileStore::new("./budgie_data"));
//!
//!     // First run: the demo birds p1 "Pippi" and p2 "Blue" are present
//!     store.add_weight_record(&RecordForm::new("p1", "32.8", "2023-10-22", "after molt"))?;
//!
//!     for card in pet_cards(store.pets(), store.records(), &ReferenceRange::default()) {
//!         println!("{}: {:?}", card.pet.name, card.summary.delta);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod export;
pub mod storage;
pub mod views;

pub use config::Config;
pub use export::{build_workbook, export_to_dir, write_xlsx, ExportError};
pub use storage::{
    FileStore, KeyValueStore, MemoryStore, Pet, PetForm, PetId, RecordForm, RecordId,
    StorageError, Store, StoreError, ValidationError, WeightRecord,
};
pub use views::{
    build_chart_series, build_history_rows, latest_and_delta, PetFilter, ViewMode, ViewState,
};
