//! Upload HTTP routes.
//!
//! - `POST /post`: raw request body, stored under a generated name
//! - `POST /post-file`: multipart form, every file field stored under its
//!   own filename

use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection,
        rejection::BytesRejection,
        DefaultBodyLimit, Multipart, State,
    },
    routing::post,
    Json, Router,
};
use tracing::{debug, warn};

use super::error::ApiError;
use super::metrics::{
    record_ingest, set_stored_files, MODE_ANONYMOUS, MODE_NAMED, OUTCOME_REJECTED,
    OUTCOME_STORED, OUTCOME_UNRECOGNIZED_SUBTYPE,
};
use super::state::{GuardedCatalog, GuardedIngestPolicy, ServerState};
use crate::ingest::{IngestError, IngestOutcome, NamedUpload};

fn update_stored_files_gauge(catalog: &GuardedCatalog) {
    match catalog.count() {
        Ok(count) => set_stored_files(count),
        Err(err) => debug!("Could not count stored files: {}", err),
    }
}

fn record_rejection(mode: &str, err: &IngestError) {
    if !matches!(err, IngestError::Store(_)) {
        record_ingest(mode, OUTCOME_REJECTED);
    }
}

/// POST /post
async fn post_raw(
    State(ingest_policy): State<GuardedIngestPolicy>,
    State(catalog): State<GuardedCatalog>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<String>, ApiError> {
    let body = body?;
    debug!("Anonymous upload of {} bytes", body.len());

    let outcome =
        tokio::task::spawn_blocking(move || ingest_policy.ingest_anonymous(&body)).await?;

    let message = match outcome {
        Ok(IngestOutcome::Stored { name }) => {
            record_ingest(MODE_ANONYMOUS, OUTCOME_STORED);
            format!("successfully saved file {}", name)
        }
        Ok(IngestOutcome::UnrecognizedSubtype { subtype, .. }) => {
            record_ingest(MODE_ANONYMOUS, OUTCOME_UNRECOGNIZED_SUBTYPE);
            format!("successfully saved file, but unexpected audio type {}", subtype)
        }
        Err(err) => {
            record_rejection(MODE_ANONYMOUS, &err);
            return Err(err.into());
        }
    };

    update_stored_files_gauge(&catalog);
    Ok(Json(message))
}

/// POST /post-file
async fn post_files(
    State(ingest_policy): State<GuardedIngestPolicy>,
    State(catalog): State<GuardedCatalog>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<String>, ApiError> {
    let mut multipart = multipart?;
    let mut uploads = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read multipart body: {}", e);
                return Err(ApiError {
                    status: e.status(),
                    message: "invalid multipart body".to_string(),
                });
            }
        };

        // Plain form fields carry no filename and are not uploads
        let file_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        match field.bytes().await {
            Ok(bytes) => {
                debug!("Received file {} ({} bytes)", file_name, bytes.len());
                uploads.push(NamedUpload {
                    file_name,
                    data: bytes.to_vec(),
                });
            }
            Err(e) => {
                warn!("Failed to read file data for {}: {}", file_name, e);
                return Err(ApiError {
                    status: e.status(),
                    message: format!("failed to read file {}", file_name),
                });
            }
        }
    }

    let result = tokio::task::spawn_blocking(move || ingest_policy.ingest_named(uploads)).await?;

    match result {
        Ok(stored) => {
            for _ in stored.iter() {
                record_ingest(MODE_NAMED, OUTCOME_STORED);
            }
            update_stored_files_gauge(&catalog);
            Ok(Json("file saved with name preserved!".to_string()))
        }
        Err(err) => {
            record_rejection(MODE_NAMED, &err);
            Err(err.into())
        }
    }
}

pub fn make_upload_routes(state: ServerState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;
    Router::new()
        .route("/post", post(post_raw))
        .route("/post-file", post(post_files))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
