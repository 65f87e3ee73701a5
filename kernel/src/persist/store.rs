// Durable Record Storage
//
// Defines the durability contract for the two vendor tables and the
// backends that implement it. Records are opaque byte blobs addressed by
// a stable name; encoding lives one level up in `persist`.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use super::PersistError;

/// Storage backend for named table records.
///
/// Properties required from implementations:
/// - Whole-record replacement (no appends, no partial updates)
/// - Atomic: a reader sees either the previous record or the new one
/// - Durable once `write` returns `Ok`
///
/// Implementations MUST NOT:
/// - Expose a partially written record to `read`
/// - Report a missing record as an error
pub trait TableStore {
    /// Load the full contents of a record, or `None` if it was never written.
    fn read(&self, record: &str) -> Result<Option<Vec<u8>>, PersistError>;

    /// Replace the full contents of a record.
    fn write(&mut self, record: &str, bytes: &[u8]) -> Result<(), PersistError>;
}

/// One file per record inside a directory.
///
/// Writes go to a uniquely named temporary file beside the target, which is
/// synced and then renamed over the target. A crash at any point leaves the
/// target either untouched or fully replaced.
#[derive(Debug, Clone)]
pub struct FileTableStore {
    dir: PathBuf,
}

impl FileTableStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, record: &str) -> PathBuf {
        self.dir.join(record)
    }

    /// Remove temporary siblings of `record` left behind by an interrupted
    /// write. Returns how many were removed; the record itself is untouched.
    ///
    /// Must not run while another writer is using the same directory.
    pub fn sweep_temps(&self, record: &str) -> Result<usize, PersistError> {
        let prefix = format!("{record}{TMP_MARKER}");
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(PersistError::io(record, &self.dir, err)),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| PersistError::io(record, &self.dir, e))?;
            if !entry.file_name().to_string_lossy().starts_with(&prefix) {
                continue;
            }
            let path = entry.path();
            fs::remove_file(&path).map_err(|e| PersistError::io(record, &path, e))?;
            removed += 1;
        }
        Ok(removed)
    }

    fn write_temp(&self, tmp_path: &Path, record: &str, bytes: &[u8]) -> Result<(), PersistError> {
        let mut file = File::create(tmp_path).map_err(|e| PersistError::io(record, tmp_path, e))?;
        file.write_all(bytes)
            .map_err(|e| PersistError::io(record, tmp_path, e))?;
        file.sync_all()
            .map_err(|e| PersistError::io(record, tmp_path, e))?;
        Ok(())
    }
}

impl TableStore for FileTableStore {
    fn read(&self, record: &str) -> Result<Option<Vec<u8>>, PersistError> {
        let path = self.record_path(record);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(PersistError::io(record, &path, err)),
        }
    }

    fn write(&mut self, record: &str, bytes: &[u8]) -> Result<(), PersistError> {
        let path = self.record_path(record);
        let tmp_path = tmp_write_path(&path);

        if let Err(err) = self.write_temp(&tmp_path, record, bytes) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            PersistError::io(record, &path, e)
        })?;

        // Make the rename itself durable.
        let dir = File::open(&self.dir).map_err(|e| PersistError::io(record, &self.dir, e))?;
        dir.sync_all()
            .map_err(|e| PersistError::io(record, &self.dir, e))?;

        Ok(())
    }
}

const TMP_MARKER: &str = ".tmp.";

/// Temporary sibling of `path`: `<name>.tmp.<uuid>`.
pub(crate) fn tmp_write_path(path: &Path) -> PathBuf {
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!("{TMP_MARKER}{}", Uuid::new_v4().simple()));
    PathBuf::from(tmp)
}

/// In-process backend.
///
/// Clones share the same records, so a second store opened on a clone sees
/// everything the first one committed.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableStore {
    records: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every record written so far.
    pub fn record_names(&self) -> Vec<String> {
        match self.records.lock() {
            Ok(records) => records.keys().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        }
    }
}

impl TableStore for MemoryTableStore {
    fn read(&self, record: &str) -> Result<Option<Vec<u8>>, PersistError> {
        let records = self
            .records
            .lock()
            .map_err(|_| PersistError::poisoned(record))?;
        Ok(records.get(record).cloned())
    }

    fn write(&mut self, record: &str, bytes: &[u8]) -> Result<(), PersistError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| PersistError::poisoned(record))?;
        records.insert(record.to_string(), bytes.to_vec());
        Ok(())
    }
}
