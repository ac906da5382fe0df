//! Metadata extraction from embedded audio tags.

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Tag fields of a stored file. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<String>,
    /// Duration in seconds.
    pub duration: Option<f64>,
}

/// Reads the metadata of a file on disk.
///
/// Implementations must not fail on unreadable or untagged files, they report
/// the fields they could not read as `None` instead.
pub trait MetadataReader: Send + Sync {
    fn read(&self, path: &Path) -> Metadata;
}

/// Reads ID3, Vorbis comments, MP4 atoms, RIFF INFO and the other tag formats
/// lofty understands.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagMetadataReader;

impl MetadataReader for TagMetadataReader {
    fn read(&self, path: &Path) -> Metadata {
        extract_metadata(path)
    }
}

pub fn extract_metadata(path: &Path) -> Metadata {
    match extract_metadata_inner(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!("Failed to read metadata from {}: {}", path.display(), e);
            Metadata::default()
        }
    }
}

fn extract_metadata_inner(path: &Path) -> Result<Metadata, lofty::error::LoftyError> {
    let tagged_file = Probe::open(path)?.guess_file_type()?.read()?;

    let duration = tagged_file.properties().duration();
    let duration = if duration.is_zero() {
        None
    } else {
        Some(duration.as_secs_f64())
    };

    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());
    let metadata = match tag {
        Some(tag) => Metadata {
            artist: tag.artist().map(|s| s.to_string()),
            album: tag.album().map(|s| s.to_string()),
            genre: tag.genre().map(|s| s.to_string()),
            year: read_year(tag),
            duration,
        },
        None => {
            debug!("No tags found in {}", path.display());
            Metadata {
                duration,
                ..Metadata::default()
            }
        }
    };

    Ok(metadata)
}

/// The year is kept as the raw tag text so filters compare against what the
/// file actually says, e.g. `1999` or `1999-04-01`.
fn read_year(tag: &Tag) -> Option<String> {
    tag.get_string(&ItemKey::Year)
        .or_else(|| tag.get_string(&ItemKey::RecordingDate))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| tag.year().map(|y| y.to_string()))
}
