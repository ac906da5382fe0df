//! Naming rules for stored files.

use std::path::Path;

use super::IngestError;

const TEMP_PREFIX: &str = "temp";

/// Hands out `temp1`, `temp2`, ... for anonymous uploads.
///
/// The counter only moves forward, and a candidate is skipped when any stored
/// file already uses it as its stem (`temp3` or `temp3.wav`), so names stay
/// unique even when files were added by other means.
#[derive(Debug)]
pub struct TempNameGenerator {
    next: u64,
}

impl Default for TempNameGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl TempNameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_free(&mut self, existing: &[String]) -> String {
        loop {
            let candidate = format!("{}{}", TEMP_PREFIX, self.next);
            self.next += 1;
            if !existing.iter().any(|name| has_stem(name, &candidate)) {
                return candidate;
            }
        }
    }
}

fn has_stem(name: &str, stem: &str) -> bool {
    match name.strip_prefix(stem) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

/// Sanitize a client supplied filename so it can be used as a stored name.
pub fn sanitize_filename(filename: &str) -> Result<String, IngestError> {
    // Only the last path component is kept
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| IngestError::InvalidFilename(filename.to_string()))?;

    if name.contains('\0') || name.starts_with('.') {
        return Err(IngestError::InvalidFilename(filename.to_string()));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(IngestError::InvalidFilename(filename.to_string()));
    }

    Ok(sanitized)
}
