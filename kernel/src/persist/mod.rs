// Table Persistence
//
// Encodes whole tables to JSON records and back. Loading never fails:
// a missing or unreadable record degrades to an empty table.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

pub mod store;

pub use store::{FileTableStore, MemoryTableStore, TableStore};

/// Record holding the product catalog.
pub const CATALOG_RECORD: &str = "v1_products.db";

/// Record holding the accounting ledger.
pub const LEDGER_RECORD: &str = "v1_cash.db";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PersistError {
    #[error("i/o error on record {record}: {message}")]
    Io { record: String, message: String },

    #[error("could not decode record {record}: {message}")]
    Decode { record: String, message: String },

    #[error("could not encode record {record}: {message}")]
    Encode { record: String, message: String },
}

impl PersistError {
    pub(crate) fn io(record: &str, path: &Path, err: std::io::Error) -> Self {
        Self::Io {
            record: record.to_string(),
            message: format!("{}: {err}", path.display()),
        }
    }

    pub(crate) fn poisoned(record: &str) -> Self {
        Self::Io {
            record: record.to_string(),
            message: "storage lock poisoned".into(),
        }
    }
}

/// Decode one record.
///
/// `Ok(None)` means the record does not exist yet.
pub fn read_table<T, S>(store: &S, record: &str) -> Result<Option<T>, PersistError>
where
    T: DeserializeOwned,
    S: TableStore + ?Sized,
{
    let Some(bytes) = store.read(record)? else {
        return Ok(None);
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| PersistError::Decode {
            record: record.to_string(),
            message: e.to_string(),
        })
}

/// Load one table, falling back to an empty one.
///
/// Absent records are normal on first start. Anything else is logged and
/// also yields an empty table rather than blocking startup.
pub fn load_table<T, S>(store: &S, record: &str) -> T
where
    T: DeserializeOwned + Default,
    S: TableStore + ?Sized,
{
    match read_table(store, record) {
        Ok(Some(table)) => table,
        Ok(None) => T::default(),
        Err(err) => {
            error!(record, error = %err, "could not load table");
            warn!(record, "starting with an empty table");
            T::default()
        }
    }
}

/// Encode and atomically replace one table record.
pub fn save_table<T, S>(store: &mut S, record: &str, table: &T) -> Result<(), PersistError>
where
    T: Serialize,
    S: TableStore + ?Sized,
{
    let bytes = serde_json::to_vec_pretty(table).map_err(|e| PersistError::Encode {
        record: record.to_string(),
        message: e.to_string(),
    })?;
    store.write(record, &bytes)
}
