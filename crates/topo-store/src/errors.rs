//! Error helpers for topo-store
//!
//! Storage failures surface as `TopoError::Backend`; a write rejected by the
//! sibling name index surfaces as `TopoError::NameConflict`.

use serde_json::{Map, Value};
use topo_core::errors::TopoError;
use topo_core::model::{value_as_i64, FIELD_BIZ_ID, FIELD_SET_NAME};

pub use topo_core::errors::Result;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> TopoError {
    TopoError::backend(
        "migration",
        format!("Migration {} failed: {}", migration_id, reason),
    )
}

/// Create a checksum mismatch error for an already applied migration
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> TopoError {
    TopoError::backend(
        "migration_checksum",
        format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ),
    )
}

/// Create a backend error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> TopoError {
    TopoError::backend("sqlite", err.to_string())
}

/// Whether the error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Map a failed write of `data`, turning unique violations into name conflicts
pub fn from_write_error(err: rusqlite::Error, data: &Map<String, Value>) -> TopoError {
    if !is_unique_violation(&err) {
        return from_rusqlite(err);
    }
    let name = match data.get(FIELD_SET_NAME) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    TopoError::NameConflict {
        biz_id: data
            .get(FIELD_BIZ_ID)
            .and_then(value_as_i64)
            .unwrap_or_default(),
        name,
    }
}
