//! File download with single byte range support.

use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use serde::Deserialize;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, BufReader, SeekFrom},
};
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::error::{ApiError, INVALID_DOWNLOAD_NAME};
use super::state::GuardedCatalog;
use crate::catalog::CatalogError;
use crate::classifier::mime_for_file_name;

const STREAM_BUFFER_SIZE: usize = 4096 * 16;

#[derive(Deserialize, Debug)]
pub struct NameQuery {
    pub name: Option<String>,
}

impl NameQuery {
    /// The requested name, `None` when absent or empty.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start_inclusive: Option<u64>,
    end_inclusive: Option<u64>,
}

/// What part of a file a request gets once its range is checked against
/// the file length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeResolution {
    Full,
    Partial { start: u64, end: u64 },
    Unsatisfiable,
}

impl ByteRange {
    pub fn new(start_inclusive: Option<u64>, end_inclusive: Option<u64>) -> ByteRange {
        ByteRange {
            start_inclusive,
            end_inclusive,
        }
    }

    /// Parses `bytes=a-b`, `bytes=a-` and `bytes=-n`. Multiple ranges are
    /// not supported and parse as `None`.
    fn parse<S: AsRef<str>>(s: S) -> Option<ByteRange> {
        let v = s.as_ref().trim().strip_prefix("bytes=")?;
        if v.contains(',') {
            return None;
        }

        let (start, end) = v.split_once('-')?;
        let parse_bound = |bound: &str| -> Result<Option<u64>, ()> {
            let bound = bound.trim();
            if bound.is_empty() {
                Ok(None)
            } else {
                bound.parse::<u64>().map(Some).map_err(|_| ())
            }
        };

        Some(ByteRange {
            start_inclusive: parse_bound(start).ok()?,
            end_inclusive: parse_bound(end).ok()?,
        })
    }

    fn from_headers(headers: &HeaderMap) -> Option<ByteRange> {
        headers
            .get(header::RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(ByteRange::parse)
    }

    fn resolve(&self, file_length: u64) -> RangeResolution {
        match (self.start_inclusive, self.end_inclusive) {
            (None, None) => RangeResolution::Full,
            (Some(start), None) => {
                if start >= file_length {
                    RangeResolution::Unsatisfiable
                } else {
                    RangeResolution::Partial {
                        start,
                        end: file_length - 1,
                    }
                }
            }
            // Suffix range: the last `n` bytes
            (None, Some(n)) => {
                if n == 0 || file_length == 0 {
                    RangeResolution::Unsatisfiable
                } else {
                    RangeResolution::Partial {
                        start: file_length - n.min(file_length),
                        end: file_length - 1,
                    }
                }
            }
            (Some(start), Some(end)) => {
                if start > end {
                    RangeResolution::Full
                } else if start >= file_length {
                    RangeResolution::Unsatisfiable
                } else {
                    RangeResolution::Partial {
                        start,
                        end: end.min(file_length - 1),
                    }
                }
            }
        }
    }
}

/// GET /download?name=
pub async fn download(
    State(catalog): State<GuardedCatalog>,
    query: Result<Query<NameQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let name = query
        .name()
        .ok_or_else(|| ApiError::bad_request(INVALID_DOWNLOAD_NAME))?;

    let path = match catalog.fetch(name) {
        Ok(path) => path,
        Err(CatalogError::NotFound(_)) => {
            debug!("Download of unknown file {}", name);
            return Err(ApiError::bad_request(INVALID_DOWNLOAD_NAME));
        }
        Err(err) => return Err(ApiError::internal(err)),
    };

    let mut file = match File::open(&path).await {
        Ok(file) => file,
        // Removed after the lookup
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::bad_request(INVALID_DOWNLOAD_NAME))
        }
        Err(e) => return Err(ApiError::internal(e)),
    };

    let file_length = file.metadata().await.map_err(ApiError::internal)?.len();
    let content_type = mime_for_file_name(name);

    let resolution = ByteRange::from_headers(&headers)
        .map(|range| range.resolve(file_length))
        .unwrap_or(RangeResolution::Full);

    let builder = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::ACCEPT_RANGES, "bytes");

    let (builder, start, chunk_size) = match resolution {
        RangeResolution::Full => (builder.status(StatusCode::OK), 0, file_length),
        RangeResolution::Partial { start, end } => (
            builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", start, end, file_length),
                ),
            start,
            end - start + 1,
        ),
        RangeResolution::Unsatisfiable => {
            debug!("Unsatisfiable range for {} ({} bytes)", name, file_length);
            return builder
                .status(StatusCode::RANGE_NOT_SATISFIABLE)
                .header(header::CONTENT_RANGE, format!("bytes */{}", file_length))
                .body(Body::empty())
                .map_err(ApiError::internal);
        }
    };

    debug!(
        "Serving {} bytes of {} starting at {}",
        chunk_size, name, start
    );

    if start > 0 {
        file.seek(SeekFrom::Start(start))
            .await
            .map_err(ApiError::internal)?;
    }

    let file_reader = BufReader::with_capacity(STREAM_BUFFER_SIZE, file.take(chunk_size));
    let stream = ReaderStream::with_capacity(file_reader, STREAM_BUFFER_SIZE);

    builder
        .header(header::CONTENT_LENGTH, chunk_size)
        .body(Body::from_stream(stream))
        .map_err(ApiError::internal)
}

#[cfg(test)]
mod tests {
    use super::{ByteRange, RangeResolution};

    fn assert_byte_range(s: &str, a: Option<u64>, b: Option<u64>) {
        assert_eq!(ByteRange::parse(s), Some(ByteRange::new(a, b)));
    }

    fn assert_no_byte_range(s: &str) {
        assert_eq!(ByteRange::parse(s), None);
    }

    #[test]
    fn parses_byte_range() {
        assert_no_byte_range("asd");
        assert_no_byte_range("bytes=");
        assert_no_byte_range("bytes=a-b");
        assert_no_byte_range("bytes=0-1,5-6");
        assert_byte_range("bytes=-", None, None);
        assert_byte_range("bytes=11-", Some(11), None);
        assert_byte_range("bytes=-111", None, Some(111));
        assert_byte_range("bytes=11-111", Some(11), Some(111));
    }

    #[test]
    fn resolves_ranges_against_length() {
        let resolve = |a, b| ByteRange::new(a, b).resolve(100);

        assert_eq!(resolve(None, None), RangeResolution::Full);
        assert_eq!(
            resolve(Some(10), Some(19)),
            RangeResolution::Partial { start: 10, end: 19 }
        );
        assert_eq!(
            resolve(Some(90), None),
            RangeResolution::Partial { start: 90, end: 99 }
        );
        assert_eq!(
            resolve(None, Some(10)),
            RangeResolution::Partial { start: 90, end: 99 }
        );
        // End clamped to the last byte
        assert_eq!(
            resolve(Some(50), Some(500)),
            RangeResolution::Partial { start: 50, end: 99 }
        );
        // Suffix longer than the file serves all of it
        assert_eq!(
            resolve(None, Some(500)),
            RangeResolution::Partial { start: 0, end: 99 }
        );
    }

    #[test]
    fn rejects_unsatisfiable_ranges() {
        let resolve = |a, b| ByteRange::new(a, b).resolve(100);

        assert_eq!(resolve(Some(100), None), RangeResolution::Unsatisfiable);
        assert_eq!(resolve(Some(200), Some(300)), RangeResolution::Unsatisfiable);
        assert_eq!(resolve(None, Some(0)), RangeResolution::Unsatisfiable);
        assert_eq!(
            ByteRange::new(Some(0), None).resolve(0),
            RangeResolution::Unsatisfiable
        );
        // Inverted bounds are ignored
        assert_eq!(resolve(Some(20), Some(10)), RangeResolution::Full);
    }
}
