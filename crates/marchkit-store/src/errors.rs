//! Error handling for marchkit-store
//!
//! Maps driver errors into the marchkit-core taxonomy

use marchkit_core::errors::MarchkitError;

pub use marchkit_core::errors::Result;

/// Map a rusqlite error into the taxonomy.
///
/// Uniqueness violations become `Conflict` and carry the driver's
/// constraint message (e.g. "UNIQUE constraint failed:
/// marchers.drill_number"); everything else is a store failure.
pub fn from_rusqlite(err: rusqlite::Error) -> MarchkitError {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(message))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            MarchkitError::Conflict {
                constraint: message,
            }
        }
        other => MarchkitError::Storage {
            op: "sqlite".to_string(),
            message: other.to_string(),
        },
    }
}

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> MarchkitError {
    MarchkitError::Storage {
        op: "migration".to_string(),
        message: format!("Migration {migration_id} failed: {reason}"),
    }
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> MarchkitError {
    MarchkitError::Storage {
        op: "migration_checksum".to_string(),
        message: format!(
            "Checksum mismatch for migration {migration_id}: expected {expected}, got {actual}"
        ),
    }
}
