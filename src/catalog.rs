//! Read side of the store: listing, per file metadata and file lookup.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::metadata::{Metadata, MetadataReader};
use crate::query::{filter_listing, FilterPredicate, Listing};
use crate::store::{FileStore, StoreError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("No stored file named {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Catalog {
    store: Arc<dyn FileStore>,
    reader: Arc<dyn MetadataReader>,
}

impl Catalog {
    pub fn new(store: Arc<dyn FileStore>, reader: Arc<dyn MetadataReader>) -> Self {
        Self { store, reader }
    }

    /// Metadata of every stored file matching all `predicates`.
    ///
    /// Tags are read fresh from every file on each call, nothing is cached.
    pub fn list(&self, predicates: &[FilterPredicate]) -> Result<Listing, CatalogError> {
        let mut listing = Listing::new();
        for name in self.store.list()? {
            // A file removed between listing and reading is simply skipped
            if let Some(path) = self.store.path(&name) {
                listing.insert(name, self.reader.read(&path));
            }
        }

        let total = listing.len();
        let listing = filter_listing(listing, predicates);
        debug!(
            "Listing matched {} of {} files with {} filter(s)",
            listing.len(),
            total,
            predicates.len()
        );
        Ok(listing)
    }

    pub fn info(&self, name: &str) -> Result<Metadata, CatalogError> {
        let path = self.fetch(name)?;
        Ok(self.reader.read(&path))
    }

    /// Path of the stored file to stream back to the client.
    pub fn fetch(&self, name: &str) -> Result<PathBuf, CatalogError> {
        self.store
            .path(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    pub fn count(&self) -> Result<usize, CatalogError> {
        Ok(self.store.count()?)
    }
}
