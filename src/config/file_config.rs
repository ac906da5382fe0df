use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub storage_dir: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub max_upload_mb: Option<u64>,
    /// "overwrite" or "reject"
    pub overwrite_policy: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_partial_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8080\noverwrite_policy = \"reject\"").unwrap();

        let config = FileConfig::load(file.path()).unwrap();
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.overwrite_policy.as_deref(), Some("reject"));
        assert!(config.storage_dir.is_none());
        assert!(config.max_upload_mb.is_none());
    }

    #[test]
    fn reports_malformed_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();

        let err = FileConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn reports_missing_config() {
        let err = FileConfig::load(Path::new("/nonexistent/audio-depot.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
