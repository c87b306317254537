use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};
use tracing::*;

use crate::{RecordSet, StorageError, User};

pub const MEMORY_SPECIAL: &str = ":memory:";

pub trait RecordStorage: Send + Sync {
    fn load(&self) -> Result<RecordSet, StorageError>;
    fn save(&self, records: &RecordSet) -> Result<(), StorageError>;
}

/// Picks the backend for a configured path, `:memory:` keeps nothing on disk.
pub fn open(path: &str) -> Box<dyn RecordStorage> {
    if path == MEMORY_SPECIAL {
        Box::<MemoryStorage>::default()
    } else {
        Box::new(JsonFileStorage::new(path))
    }
}

/// Keeps the record set as a single JSON object in one file, rewritten whole
/// on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn write_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordStorage for JsonFileStorage {
    fn load(&self) -> Result<RecordSet, StorageError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "missing, starting empty");
                return Ok(RecordSet::new());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if data.trim().is_empty() {
            info!(path = %self.path.display(), "empty, starting empty");
            return Ok(RecordSet::new());
        }

        let records: RecordSet =
            serde_json::from_str(&data).map_err(|source| StorageError::Parse {
                path: self.path.clone(),
                source,
            })?;

        for (username, entry) in records.iter() {
            if let Some(field) = User::from_entry(username, entry).missing_field() {
                return Err(StorageError::Invalid {
                    path: self.path.clone(),
                    username: username.clone(),
                    field,
                });
            }
        }

        debug!(path = %self.path.display(), users = records.len(), "loaded");

        Ok(records)
    }

    fn save(&self, records: &RecordSet) -> Result<(), StorageError> {
        let mut bytes = serde_json::to_vec_pretty(records).map_err(StorageError::Serialize)?;
        bytes.push(b'\n');

        // Temp file shares the directory so the rename stays on one filesystem.
        let mut temp =
            tempfile::NamedTempFile::new_in(self.directory()).map_err(|e| self.write_error(e))?;
        temp.write_all(&bytes).map_err(|e| self.write_error(e))?;
        temp.as_file().sync_all().map_err(|e| self.write_error(e))?;

        // Temp files are created 0600, keep whatever mode the file already had.
        match std::fs::metadata(&self.path) {
            Ok(existing) => temp
                .as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| self.write_error(e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(self.write_error(e)),
        }

        temp.persist(&self.path)
            .map_err(|e| self.write_error(e.error))?;

        debug!(path = %self.path.display(), users = records.len(), "saved");

        Ok(())
    }
}

/// Holds the last saved record set in memory. Writes can be made to fail,
/// which is how tests exercise the persistence failure path.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    saved: Mutex<RecordSet>,
    failing: AtomicBool,
}

impl MemoryStorage {
    pub fn with_records(records: RecordSet) -> Self {
        Self {
            saved: Mutex::new(records),
            failing: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn saved(&self) -> Result<RecordSet, StorageError> {
        Ok(self
            .saved
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .clone())
    }
}

impl RecordStorage for MemoryStorage {
    fn load(&self) -> Result<RecordSet, StorageError> {
        self.saved()
    }

    fn save(&self, records: &RecordSet) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Write {
                path: PathBuf::from(MEMORY_SPECIAL),
                source: std::io::Error::new(std::io::ErrorKind::Other, "writes disabled"),
            });
        }

        let mut saved = self.saved.lock().map_err(|_| StorageError::Poisoned)?;
        *saved = records.clone();

        Ok(())
    }
}

impl<T> RecordStorage for std::sync::Arc<T>
where
    T: RecordStorage + ?Sized,
{
    fn load(&self) -> Result<RecordSet, StorageError> {
        (**self).load()
    }

    fn save(&self, records: &RecordSet) -> Result<(), StorageError> {
        (**self).save(records)
    }
}
