//! FileStore trait definition.
//!
//! The store is a flat namespace of named files. Ingest and query code only
//! talk to this trait, so the flat directory can later be replaced by an
//! indexed backend without touching them.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No stored file named {0}")]
    NotFound(String),

    #[error("Invalid stored file name: {0}")]
    InvalidName(String),
}

pub trait FileStore: Send + Sync {
    /// Writes `data` under `name`, replacing any existing file with that name.
    fn add(&self, name: &str, data: &[u8]) -> Result<(), StoreError>;

    /// Names of all stored files, sorted.
    fn list(&self) -> Result<Vec<String>, StoreError>;

    fn exists(&self, name: &str) -> bool;

    /// Filesystem path of a stored file, `None` if no such file exists.
    fn path(&self, name: &str) -> Option<PathBuf>;

    fn rename(&self, from: &str, to: &str) -> Result<(), StoreError>;

    fn remove(&self, name: &str) -> Result<(), StoreError>;

    /// Removes every stored file. Returns how many were removed.
    fn purge(&self) -> Result<usize, StoreError>;

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.list()?.len())
    }
}
