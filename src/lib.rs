//! Audio Depot Library
//!
//! A small HTTP store for audio files: uploads are checked by content,
//! stored in a flat directory and listed with tag based filters.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod ingest;
pub mod metadata;
pub mod query;
pub mod server;
pub mod store;

// Re-export commonly used types for convenience
pub use catalog::Catalog;
pub use ingest::{IngestPolicy, OverwritePolicy};
pub use metadata::{Metadata, TagMetadataReader};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use store::{DirectoryFileStore, FileStore};
