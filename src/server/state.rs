use axum::extract::FromRef;

use crate::catalog::Catalog;
use crate::ingest::IngestPolicy;
use std::sync::Arc;

use super::ServerConfig;

pub type GuardedCatalog = Arc<Catalog>;
pub type GuardedIngestPolicy = Arc<IngestPolicy>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub catalog: GuardedCatalog,
    pub ingest_policy: GuardedIngestPolicy,
}

impl FromRef<ServerState> for GuardedCatalog {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog.clone()
    }
}

impl FromRef<ServerState> for GuardedIngestPolicy {
    fn from_ref(input: &ServerState) -> Self {
        input.ingest_policy.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
