use super::trait_def::{FileStore, StoreError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A [`FileStore`] backed by a single flat directory.
pub struct DirectoryFileStore {
    root: PathBuf,
}

impl DirectoryFileStore {
    /// Opens the store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_name(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

/// Stored names are a single path component: no separators, no traversal and
/// no hidden files.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(|c| matches!(c, '/' | '\\' | '\0'))
}

impl FileStore for DirectoryFileStore {
    fn add(&self, name: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve(name)?;
        let mut file = fs::File::create(&path)?;
        file.write_all(data)?;
        file.flush()?;
        debug!("Stored {} ({} bytes)", path.display(), data.len());
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> bool {
        self.path(name).is_some()
    }

    fn path(&self, name: &str) -> Option<PathBuf> {
        let path = self.resolve(name).ok()?;
        path.is_file().then_some(path)
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), StoreError> {
        let source = self
            .path(from)
            .ok_or_else(|| StoreError::NotFound(from.to_string()))?;
        let target = self.resolve(to)?;
        fs::rename(source, target)?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        let path = self
            .path(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        fs::remove_file(path)?;
        Ok(())
    }

    fn purge(&self) -> Result<usize, StoreError> {
        let names = self.list()?;
        for name in names.iter() {
            fs::remove_file(self.root.join(name))?;
        }
        Ok(names.len())
    }
}
