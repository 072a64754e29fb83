//! Error types for the record store

use thiserror::Error;

/// Result alias used across the store
pub type Result<T> = std::result::Result<T, StoreError>;

/// Why a payload was refused at insert time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The request carried no build data at all
    #[error("no build data was sent")]
    EmptyPayload,

    /// One or more required keys are absent, in declared order
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

/// Errors surfaced by record store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Absent or expired, the caller cannot tell which
    #[error("record not found or expired: {0}")]
    NotFound(String),

    #[error("persistence error: {0}")]
    Persistence(String),
}
