//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own storage directory.

use super::constants::*;
use audio_depot::catalog::Catalog;
use audio_depot::ingest::{IngestPolicy, OverwritePolicy};
use audio_depot::metadata::TagMetadataReader;
use audio_depot::server::{make_app, RequestsLoggingLevel, ServerConfig};
use audio_depot::store::{DirectoryFileStore, FileStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated storage directory
///
/// When dropped, the server gracefully shuts down and the directory is removed.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The store the server writes to, for direct inspection in tests
    pub store: Arc<dyn FileStore>,

    // Private fields - keep resources alive until drop
    _storage_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with the default overwrite policy
    pub async fn spawn() -> Self {
        Self::spawn_with_policy(OverwritePolicy::Overwrite).await
    }

    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the storage directory cannot be created, the port cannot be
    /// bound or the server does not become ready within the timeout.
    pub async fn spawn_with_policy(overwrite_policy: OverwritePolicy) -> Self {
        let storage_dir = TempDir::new().expect("Failed to create storage dir");
        let store: Arc<dyn FileStore> = Arc::new(
            DirectoryFileStore::new(storage_dir.path()).expect("Failed to open store"),
        );

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };

        let catalog = Catalog::new(store.clone(), Arc::new(TagMetadataReader));
        let ingest_policy = IngestPolicy::new(store.clone(), overwrite_policy);
        let app = make_app(config, Arc::new(catalog), Arc::new(ingest_policy));

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            store,
            _storage_dir: storage_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Names currently in the storage directory
    #[allow(dead_code)]
    pub fn stored_files(&self) -> Vec<String> {
        self.store.list().expect("Failed to list store")
    }

    /// Waits for the server to become ready by polling `/`
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
