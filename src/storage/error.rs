//! Storage error types
//!
//! Errors from the persistence layer and from store mutations.

use thiserror::Error;

/// Errors that can occur while reading or writing persisted state
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Key contains characters that cannot be used as a file name
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Form input that cannot be turned into a pet or a weight record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Pet name must not be empty")]
    EmptyName,

    #[error("A pet must be selected")]
    MissingPet,

    #[error("Weight is required")]
    MissingWeight,

    #[error("Invalid weight: {0:?} (expected a positive number of grams)")]
    InvalidWeight(String),

    #[error("Date is required")]
    MissingDate,

    #[error("Invalid date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Errors returned by store mutations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Input rejected; nothing was changed
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Pet not found: {0}")]
    PetNotFound(String),

    #[error("Weight record not found: {0}")]
    RecordNotFound(String),

    /// The mutation was applied in memory but could not be persisted
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
