//! Request logging middleware

use super::super::state::ServerState;
use crate::server::metrics::record_http_request;
use axum::extract::{MatchedPath, State};
use axum::{
    body::Body,
    http::{header::HeaderMap, Request, Response, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use std::time::Instant;
use tracing::{error, info};

#[derive(PartialEq, PartialOrd, Clone, Debug, Default, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    #[default]
    Path,
    Headers,
    Body,
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

const MAX_LOGGABLE_BODY_LENGTH: usize = 1024;

/// Route label for requests that did not match any route.
const UNMATCHED_PATH: &str = "unmatched";

enum ContentLengthParseResult {
    Ok(usize),
    No(&'static str),
}

fn parse_content_length(headers: &HeaderMap) -> ContentLengthParseResult {
    let value = match headers.get("content-length") {
        Some(x) => x,
        None => return ContentLengthParseResult::No("Content-length not set."),
    };

    let str_value = match value.to_str() {
        Ok(x) => x,
        Err(_) => {
            return ContentLengthParseResult::No("Could not get Content-length string value.")
        }
    };

    match str_value.parse::<usize>() {
        Ok(x) => ContentLengthParseResult::Ok(x),
        Err(_) => ContentLengthParseResult::No("Could not parse Content-length numeric value."),
    }
}

fn log_headers(title: &str, headers: &HeaderMap) {
    info!("  {}:", title);
    for header in headers.iter() {
        info!("    {:?}: {:?}", header.0, header.1);
    }
}

/// Buffers a small body so it can be logged, returning it for reuse.
/// `Err` means the body could not be read and the request must fail.
async fn log_body(title: &str, headers: &HeaderMap, body: Body) -> Result<Body, ()> {
    match parse_content_length(headers) {
        ContentLengthParseResult::No(reason) => {
            info!("  {}: {}", title, reason);
            Ok(body)
        }
        ContentLengthParseResult::Ok(size) if size < MAX_LOGGABLE_BODY_LENGTH => {
            let bytes = match axum::body::to_bytes(body, size).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    error!("Failed to read {}: {:?}", title, err);
                    return Err(());
                }
            };
            info!("  {}:\n{}", title, String::from_utf8_lossy(&bytes));
            Ok(Body::from(bytes))
        }
        ContentLengthParseResult::Ok(size) => {
            info!(
                "  {}: Too big to log ({:#})",
                title,
                byte_unit::Byte::from(size)
            );
            Ok(body)
        }
    }
}

pub async fn log_requests(
    State(state): State<ServerState>,
    mut request: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    let level = state.config.requests_logging_level.clone();

    let start = Instant::now();

    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string());

    if level > RequestsLoggingLevel::None {
        info!(">>> {} {}", method, uri);
    }

    if level >= RequestsLoggingLevel::Headers {
        log_headers("Req Headers", request.headers());
    }

    if level >= RequestsLoggingLevel::Body {
        let (parts, body) = request.into_parts();
        match log_body("Req Body", &parts.headers, body).await {
            Ok(body) => request = Request::from_parts(parts, body),
            Err(()) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }

    let mut response = next.run(request).await;

    if level >= RequestsLoggingLevel::Headers {
        log_headers("Resp Headers", response.headers());
    }

    if level >= RequestsLoggingLevel::Body {
        let (parts, body) = response.into_parts();
        match log_body("Resp Body", &parts.headers, body).await {
            Ok(body) => response = Response::from_parts(parts, body),
            Err(()) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }

    let status = response.status().as_u16();
    let duration = start.elapsed();

    if level > RequestsLoggingLevel::None {
        info!("<<< {} ({}ms)", status, duration.as_millis());
    }

    record_http_request(&method, &route, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering() {
        let none = RequestsLoggingLevel::None;

        assert!(none < RequestsLoggingLevel::Headers);
        assert!(RequestsLoggingLevel::Body > RequestsLoggingLevel::None);
        assert_eq!(RequestsLoggingLevel::default(), RequestsLoggingLevel::Path);
    }

    #[test]
    fn parses_content_length() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            parse_content_length(&headers),
            ContentLengthParseResult::No(_)
        ));

        headers.insert("content-length", "42".parse().unwrap());
        assert!(matches!(
            parse_content_length(&headers),
            ContentLengthParseResult::Ok(42)
        ));

        headers.insert("content-length", "forty-two".parse().unwrap());
        assert!(matches!(
            parse_content_length(&headers),
            ContentLengthParseResult::No(_)
        ));
    }
}
