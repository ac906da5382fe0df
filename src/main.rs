use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use audio_depot::catalog::Catalog;
use audio_depot::config;
use audio_depot::ingest::{IngestPolicy, OverwritePolicy};
use audio_depot::metadata::TagMetadataReader;
use audio_depot::server::{metrics, run_server, RequestsLoggingLevel, ServerConfig};
use audio_depot::store::{DirectoryFileStore, FileStore};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory the uploaded files are stored in. Emptied on every start.
    #[clap(long, value_parser = parse_path)]
    pub storage_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Maximum size of an upload request body, in MiB.
    #[clap(long, default_value_t = config::DEFAULT_MAX_UPLOAD_MB)]
    pub max_upload_mb: u64,

    /// What a named upload does when a file with the same name is stored.
    #[clap(long, default_value = "overwrite")]
    pub overwrite_policy: OverwritePolicy,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            storage_dir: args.storage_dir.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            max_upload_mb: args.max_upload_mb,
            overwrite_policy: args.overwrite_policy,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  storage_dir: {:?}", app_config.storage_dir);
    info!("  port: {}", app_config.port);
    info!("  max_upload_mb: {}", app_config.max_upload_mb);
    info!("  overwrite_policy: {}", app_config.overwrite_policy);

    let store = DirectoryFileStore::new(&app_config.storage_dir).with_context(|| {
        format!(
            "Failed to open storage directory {:?}",
            app_config.storage_dir
        )
    })?;

    let purged = store
        .purge()
        .context("Failed to purge storage directory")?;
    warn!(
        "Purged {} file(s) from {:?}, the store starts empty",
        purged, app_config.storage_dir
    );
    let store: Arc<dyn FileStore> = Arc::new(store);

    // Initialize metrics system
    info!("Initializing metrics...");
    metrics::init_metrics();
    metrics::set_stored_files(0);

    let catalog = Catalog::new(store.clone(), Arc::new(TagMetadataReader));
    let ingest_policy = IngestPolicy::new(store, app_config.overwrite_policy);

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        max_upload_bytes: app_config.max_upload_bytes(),
    };

    info!("Ready to serve at port {}!", app_config.port);
    info!("Metrics available at port {}!", app_config.metrics_port);
    run_server(
        server_config,
        catalog,
        ingest_policy,
        app_config.metrics_port,
    )
    .await
}
