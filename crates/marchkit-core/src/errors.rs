//! Error taxonomy for marchkit operations
//!
//! One enum covers every failure the store surfaces to its callers. The
//! boundary treats validation/no-op/conflict/not-found as recoverable and
//! user-correctable; `Storage` is fatal to the current operation.

use thiserror::Error;

use crate::ids::EntityKind;

/// Result type alias using MarchkitError
pub type Result<T> = std::result::Result<T, MarchkitError>;

/// Comprehensive error taxonomy for marchkit operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarchkitError {
    // ===== Validation Errors =====
    /// A required field was missing or empty in a create or update payload
    #[error("{entity}: required field `{field}` is missing or empty")]
    MissingField {
        entity: EntityKind,
        field: &'static str,
    },

    /// An update payload had none of the entity's mutable fields set
    #[error("{entity}: update payload contains no updatable fields")]
    EmptyUpdate { entity: EntityKind },

    // ===== Lookup Errors =====
    /// Marcher not found in the store
    #[error("Marcher not found: {id}")]
    MarcherNotFound { id: i64 },

    /// Page not found in the store
    #[error("Page not found: {id}")]
    PageNotFound { id: i64 },

    /// No coordinate row exists for this (marcher, page) pair
    #[error("MarcherPage not found for marcher {marcher_id} on page {page_id}")]
    MarcherPageNotFound { marcher_id: i64, page_id: i64 },

    // ===== Store Errors =====
    /// A uniqueness constraint rejected the write
    #[error("Conflict: {constraint}")]
    Conflict { constraint: String },

    /// The underlying store could not execute the operation
    #[error("Store failure during {op}: {message}")]
    Storage { op: String, message: String },
}

impl MarchkitError {
    /// True for conditions a caller can correct and retry (bad input,
    /// duplicate value, missing row); false for store failures.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, MarchkitError::Storage { .. })
    }
}
