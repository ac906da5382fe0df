use anyhow::{Context, Result};
use std::sync::Arc;

use tracing::{debug, error, info};

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    middleware,
    routing::get,
    Json, Router,
};

use super::download::{download, NameQuery};
use super::error::{ApiError, INVALID_INFO_NAME};
use super::metrics::metrics_handler;
use super::upload_routes::make_upload_routes;
use super::{log_requests, state::*, ServerConfig};
use crate::catalog::{Catalog, CatalogError};
use crate::ingest::IngestPolicy;
use crate::metadata::Metadata;
use crate::query::{parse_predicates, Listing};

async fn home() -> &'static str {
    "Hello"
}

/// GET /list
///
/// Every query parameter is a filter, repeated keys all apply.
async fn list(
    State(catalog): State<GuardedCatalog>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Listing>, ApiError> {
    let Query(params) = query?;
    let predicates = parse_predicates(&params)?;
    debug!("Listing with {} filter(s)", predicates.len());

    let listing = tokio::task::spawn_blocking(move || catalog.list(&predicates))
        .await?
        .map_err(ApiError::internal)?;
    Ok(Json(listing))
}

/// GET /info?name=
async fn info(
    State(catalog): State<GuardedCatalog>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> Result<Json<Metadata>, ApiError> {
    let Query(query) = query?;
    let name = query
        .name()
        .ok_or_else(|| ApiError::bad_request(INVALID_INFO_NAME))?
        .to_string();

    let result = tokio::task::spawn_blocking(move || catalog.info(&name)).await?;
    match result {
        Ok(metadata) => Ok(Json(metadata)),
        Err(CatalogError::NotFound(_)) => Err(ApiError::bad_request(INVALID_INFO_NAME)),
        Err(err) => Err(ApiError::internal(err)),
    }
}

pub fn make_app(
    config: ServerConfig,
    catalog: GuardedCatalog,
    ingest_policy: GuardedIngestPolicy,
) -> Router {
    let state = ServerState {
        config,
        catalog,
        ingest_policy,
    };

    let read_routes: Router = Router::new()
        .route("/", get(home))
        .route("/download", get(download))
        .route("/list", get(list))
        .route("/info", get(info))
        .with_state(state.clone());

    read_routes
        .merge(make_upload_routes(state.clone()))
        .layer(middleware::from_fn_with_state(state, log_requests))
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}

pub async fn run_server(
    config: ServerConfig,
    catalog: Catalog,
    ingest_policy: IngestPolicy,
    metrics_port: u16,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, Arc::new(catalog), Arc::new(ingest_policy));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, make_metrics_app())
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("Metrics server failed: {}", err);
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")
}
