use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, info, warn};

use super::naming::{sanitize_filename, TempNameGenerator};
use super::IngestError;
use crate::classifier::{classify_bytes, classify_file};
use crate::store::{FileStore, StoreError};

/// What to do when a named upload targets a name that is already stored.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OverwritePolicy {
    /// Replace the stored file, last write wins.
    #[default]
    Overwrite,
    /// Fail the whole batch.
    Reject,
}

impl std::fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Result of an anonymous upload that was kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Stored under its final, extension qualified name.
    Stored { name: String },
    /// The content is audio, but of a subtype with no known extension. The
    /// bytes are kept under the temporary name.
    UnrecognizedSubtype { name: String, subtype: String },
}

/// A file from a multipart upload.
#[derive(Debug, Clone)]
pub struct NamedUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Accepts uploads into a [`FileStore`], enforcing that only audio is kept.
pub struct IngestPolicy {
    store: Arc<dyn FileStore>,
    overwrite_policy: OverwritePolicy,
    temp_names: Mutex<TempNameGenerator>,
}

impl IngestPolicy {
    pub fn new(store: Arc<dyn FileStore>, overwrite_policy: OverwritePolicy) -> Self {
        Self {
            store,
            overwrite_policy,
            temp_names: Mutex::new(TempNameGenerator::new()),
        }
    }

    /// Stores an unnamed upload.
    ///
    /// The bytes are first written under a fresh temporary name, then the
    /// stored file is classified. Non audio content is removed again, known
    /// audio gets its extension appended.
    pub fn ingest_anonymous(&self, data: &[u8]) -> Result<IngestOutcome, IngestError> {
        let temp_name = self.write_temp_file(data)?;

        let path = self
            .store
            .path(&temp_name)
            .ok_or_else(|| StoreError::NotFound(temp_name.clone()))?;
        let content_type = match classify_file(&path) {
            Ok(content_type) => content_type,
            Err(e) => {
                self.discard_temp_file(&temp_name);
                return Err(StoreError::from(e).into());
            }
        };
        debug!("Anonymous upload {} classified as {}", temp_name, content_type);

        if !content_type.is_audio() {
            self.store.remove(&temp_name)?;
            info!(
                "Rejected anonymous upload of {} bytes ({})",
                data.len(),
                content_type
            );
            return Err(IngestError::InvalidFileType {
                file_name: None,
                detected: content_type,
            });
        }

        match content_type.audio_extension() {
            Some(ext) => {
                let final_name = format!("{}.{}", temp_name, ext);
                if let Err(e) = self.store.rename(&temp_name, &final_name) {
                    self.discard_temp_file(&temp_name);
                    return Err(e.into());
                }
                info!("Stored anonymous upload as {}", final_name);
                Ok(IngestOutcome::Stored { name: final_name })
            }
            None => {
                warn!(
                    "Stored {} without extension, unexpected audio type {}",
                    temp_name, content_type.subtype
                );
                Ok(IngestOutcome::UnrecognizedSubtype {
                    name: temp_name,
                    subtype: content_type.subtype,
                })
            }
        }
    }

    /// Removes a temp file left behind by a failed anonymous upload.
    fn discard_temp_file(&self, temp_name: &str) {
        if let Err(e) = self.store.remove(temp_name) {
            error!("Failed to remove temp file {}: {}", temp_name, e);
        }
    }

    /// Picks the temporary name and writes the bytes while holding the naming
    /// lock, so two concurrent uploads can never pick the same name.
    fn write_temp_file(&self, data: &[u8]) -> Result<String, IngestError> {
        let mut temp_names = self
            .temp_names
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let existing = self.store.list()?;
        let temp_name = temp_names.next_free(&existing);
        self.store.add(&temp_name, data)?;
        Ok(temp_name)
    }

    /// Stores a batch of named uploads, all or nothing.
    ///
    /// Every file is validated before anything is written: one non audio file
    /// or one bad name fails the batch and leaves the store untouched. Returns
    /// the stored names in upload order.
    pub fn ingest_named(&self, uploads: Vec<NamedUpload>) -> Result<Vec<String>, IngestError> {
        if uploads.is_empty() {
            return Err(IngestError::NoFileSubmitted);
        }

        let mut accepted: Vec<(String, &Vec<u8>)> = Vec::with_capacity(uploads.len());
        let mut batch_names = HashSet::new();
        for upload in uploads.iter() {
            let content_type = classify_bytes(&upload.data);
            if !content_type.is_audio() {
                info!(
                    "Rejected upload batch, {} is {}",
                    upload.file_name, content_type
                );
                return Err(IngestError::InvalidFileType {
                    file_name: Some(upload.file_name.clone()),
                    detected: content_type,
                });
            }

            let name = sanitize_filename(&upload.file_name)?;
            if self.overwrite_policy == OverwritePolicy::Reject && self.store.exists(&name) {
                return Err(IngestError::NameTaken(name));
            }
            if !batch_names.insert(name.clone()) {
                if self.overwrite_policy == OverwritePolicy::Reject {
                    info!("Rejected upload batch, {} appears twice", name);
                    return Err(IngestError::NameTaken(name));
                }
                // Last file with a name wins, as it would across requests
                warn!("Upload batch repeats {}, keeping the last one", name);
                accepted.retain(|(accepted_name, _)| *accepted_name != name);
            }
            accepted.push((name, &upload.data));
        }

        let mut stored = Vec::with_capacity(accepted.len());
        for (name, data) in accepted {
            if self.store.exists(&name) {
                debug!("Overwriting stored file {}", name);
            }
            self.store.add(&name, data)?;
            stored.push(name);
        }
        info!("Stored {} named upload(s): {:?}", stored.len(), stored);
        Ok(stored)
    }
}
