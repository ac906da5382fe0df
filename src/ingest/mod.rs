//! Upload handling: decides whether uploaded content is kept and under which
//! name.
//!
//! Two upload modes exist:
//! 1. Anonymous raw bytes, stored under a generated `temp<N>` name that gets
//!    the extension of the detected audio type
//! 2. Named multipart files, validated as a batch and stored under their
//!    (sanitized) client names

mod naming;
mod policy;

pub use naming::{sanitize_filename, TempNameGenerator};
pub use policy::{IngestOutcome, IngestPolicy, NamedUpload, OverwritePolicy};

use crate::classifier::ContentType;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Content is not audio ({detected})")]
    InvalidFileType {
        /// Client filename, only known for named uploads.
        file_name: Option<String>,
        detected: ContentType,
    },

    #[error("No file submitted")]
    NoFileSubmitted,

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("A file named {0} is already stored")]
    NameTaken(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
