mod directory_store;
mod trait_def;

pub use directory_store::DirectoryFileStore;
pub use trait_def::{FileStore, StoreError};
