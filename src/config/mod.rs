mod file_config;

pub use file_config::FileConfig;

use crate::ingest::OverwritePolicy;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_STORAGE_DIR: &str = "files";
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 64;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub storage_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub max_upload_mb: u64,
    pub overwrite_policy: OverwritePolicy,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the stored files. Purged on every startup.
    pub storage_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub max_upload_mb: u64,
    pub overwrite_policy: OverwritePolicy,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let storage_dir = file
            .storage_dir
            .map(PathBuf::from)
            .or_else(|| cli.storage_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));

        if storage_dir.exists() && !storage_dir.is_dir() {
            bail!("storage_dir is not a directory: {:?}", storage_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port && port != 0 {
            bail!("port and metrics_port must differ (both are {})", port);
        }

        let logging_level = match file.logging_level {
            Some(s) => match RequestsLoggingLevel::from_str(&s, true) {
                Ok(level) => level,
                Err(_) => bail!("Invalid logging_level in config file: {}", s),
            },
            None => cli.logging_level.clone(),
        };

        let max_upload_mb = file.max_upload_mb.unwrap_or(cli.max_upload_mb);
        if max_upload_mb == 0 {
            bail!("max_upload_mb must be greater than 0");
        }

        let overwrite_policy = match file.overwrite_policy {
            Some(s) => match OverwritePolicy::from_str(&s, true) {
                Ok(policy) => policy,
                Err(_) => bail!("Invalid overwrite_policy in config file: {}", s),
            },
            None => cli.overwrite_policy,
        };

        Ok(Self {
            storage_dir,
            port,
            metrics_port,
            logging_level,
            max_upload_mb,
            overwrite_policy,
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_mb as usize).saturating_mul(1024 * 1024)
    }
}
