use super::QueryError;
use crate::metadata::Metadata;

pub const MAX_DURATION: &str = "maxduration";
pub const MIN_DURATION: &str = "minduration";
pub const ARTIST: &str = "artist";
pub const GENRE: &str = "genre";
pub const ALBUM: &str = "album";
pub const YEAR: &str = "year";

/// Every filter name a listing request may use.
pub const FILTER_KEYS: &[&str] = &[MAX_DURATION, MIN_DURATION, ARTIST, GENRE, ALBUM, YEAR];

/// A single filter condition on a stored file's metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    /// Duration in seconds is at most this value.
    MaxDuration(f64),
    /// Duration in seconds is at least this value.
    MinDuration(f64),
    Artist(String),
    Genre(String),
    Album(String),
    Year(String),
}

impl FilterPredicate {
    pub fn parse(key: &str, value: &str) -> Result<FilterPredicate, QueryError> {
        match key {
            MAX_DURATION => parse_seconds(key, value).map(FilterPredicate::MaxDuration),
            MIN_DURATION => parse_seconds(key, value).map(FilterPredicate::MinDuration),
            ARTIST => Ok(FilterPredicate::Artist(value.to_string())),
            GENRE => Ok(FilterPredicate::Genre(value.to_string())),
            ALBUM => Ok(FilterPredicate::Album(value.to_string())),
            YEAR => Ok(FilterPredicate::Year(value.to_string())),
            _ => Err(QueryError::InvalidArgument(key.to_string())),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            FilterPredicate::MaxDuration(_) => MAX_DURATION,
            FilterPredicate::MinDuration(_) => MIN_DURATION,
            FilterPredicate::Artist(_) => ARTIST,
            FilterPredicate::Genre(_) => GENRE,
            FilterPredicate::Album(_) => ALBUM,
            FilterPredicate::Year(_) => YEAR,
        }
    }

    /// A missing field never matches: `None` is neither equal to a requested
    /// value nor within a duration bound.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        match self {
            FilterPredicate::MaxDuration(max) => metadata.duration.is_some_and(|d| d <= *max),
            FilterPredicate::MinDuration(min) => metadata.duration.is_some_and(|d| d >= *min),
            FilterPredicate::Artist(wanted) => metadata.artist.as_deref() == Some(wanted.as_str()),
            FilterPredicate::Genre(wanted) => metadata.genre.as_deref() == Some(wanted.as_str()),
            FilterPredicate::Album(wanted) => metadata.album.as_deref() == Some(wanted.as_str()),
            FilterPredicate::Year(wanted) => metadata.year.as_deref() == Some(wanted.as_str()),
        }
    }
}

fn parse_seconds(key: &str, value: &str) -> Result<f64, QueryError> {
    match value.trim().parse::<f64>() {
        Ok(seconds) if seconds.is_finite() => Ok(seconds),
        _ => Err(QueryError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parses query string pairs into predicates.
///
/// Keys are checked before values, so an unknown filter name is reported even
/// when another pair also carries a malformed value.
pub fn parse_predicates<K, V>(pairs: &[(K, V)]) -> Result<Vec<FilterPredicate>, QueryError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if let Some((key, _)) = pairs
        .iter()
        .find(|(key, _)| !FILTER_KEYS.contains(&key.as_ref()))
    {
        return Err(QueryError::InvalidArgument(key.as_ref().to_string()));
    }

    pairs
        .iter()
        .map(|(key, value)| FilterPredicate::parse(key.as_ref(), value.as_ref()))
        .collect()
}
