//! Content type detection for uploaded files.
//!
//! Detection looks at the magic numbers at the start of the content, never at
//! the filename the client sent.

use std::fmt;
use std::io::Read;
use std::path::Path;

/// How many leading bytes are inspected when classifying a stored file.
const SNIFF_LEN: u64 = 8192;

/// Known audio subtypes and the extension stored files of that type get.
///
/// Several subtypes appear twice because the same container is reported under
/// both its registered and its `x-` prefixed name by different detectors.
const AUDIO_EXTENSIONS: &[(&str, &str)] = &[
    ("mpeg", "mp3"),
    ("x-wav", "wav"),
    ("wav", "wav"),
    ("x-m4a", "m4a"),
    ("m4a", "m4a"),
    ("x-flac", "flac"),
    ("flac", "flac"),
    ("x-hx-aac-adts", "aac"),
    ("aac", "aac"),
    ("x-aiff", "aiff"),
    ("aiff", "aiff"),
];

pub const AUDIO_CATEGORY: &str = "audio";

/// A MIME type split into its category and subtype, e.g. `audio` / `mpeg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    pub category: String,
    pub subtype: String,
}

impl ContentType {
    fn from_mime(mime: &str) -> ContentType {
        let (category, subtype) = mime.split_once('/').unwrap_or((mime, ""));
        ContentType {
            category: category.to_string(),
            subtype: subtype.to_string(),
        }
    }

    pub fn is_audio(&self) -> bool {
        self.category == AUDIO_CATEGORY
    }

    /// The extension for this audio subtype, `None` if the subtype is not in
    /// the table or the content is not audio at all.
    pub fn audio_extension(&self) -> Option<&'static str> {
        if !self.is_audio() {
            return None;
        }
        extension_for_subtype(&self.subtype)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.subtype)
    }
}

pub fn extension_for_subtype(subtype: &str) -> Option<&'static str> {
    AUDIO_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == subtype)
        .map(|(_, ext)| *ext)
}

/// Maps a stored file name back to the MIME type to serve it with.
pub fn mime_for_file_name(name: &str) -> String {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    let subtype = ext.and_then(|ext| {
        AUDIO_EXTENSIONS
            .iter()
            .find(|(_, known)| *known == ext)
            .map(|(subtype, _)| *subtype)
    });

    match subtype {
        Some(subtype) => format!("{}/{}", AUDIO_CATEGORY, subtype),
        None => "application/octet-stream".to_string(),
    }
}

/// Classifies raw bytes.
///
/// Content without a recognizable signature falls back to `inode/x-empty`,
/// `text/plain` or `application/octet-stream`, so the result always carries a
/// category.
pub fn classify_bytes(bytes: &[u8]) -> ContentType {
    if let Some(kind) = infer::get(bytes) {
        return ContentType::from_mime(kind.mime_type());
    }

    let fallback = if bytes.is_empty() {
        "inode/x-empty"
    } else if std::str::from_utf8(bytes).is_ok() {
        "text/plain"
    } else {
        "application/octet-stream"
    };
    ContentType::from_mime(fallback)
}

/// Classifies a file that is already on disk by sniffing its first bytes.
pub fn classify_file(path: &Path) -> std::io::Result<ContentType> {
    let file = std::fs::File::open(path)?;
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    file.take(SNIFF_LEN).read_to_end(&mut head)?;
    Ok(classify_bytes(&head))
}
