use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Missing required field: {field}")]
    Validation { field: &'static str },
    #[error("Username '{0}' cannot be changed to '{1}'")]
    Rename(String, String),
    #[error("Username '{0}' is already taken")]
    Conflict(String),
    #[error("User '{0}' does not exist")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl StoreError {
    /// True for errors caused by the request itself rather than by storage.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StoreError::Storage(_))
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Reading '{}' failed", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Writing '{}' failed", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed records in '{}'", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("User '{}' in '{}' is missing {}", .username, .path.display(), .field)]
    Invalid {
        path: PathBuf,
        username: String,
        field: &'static str,
    },
    #[error("Serializing records failed")]
    Serialize(#[source] serde_json::Error),
    #[error("Record set lock poisoned")]
    Poisoned,
}
