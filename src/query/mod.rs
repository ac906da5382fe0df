//! Filtering of the stored files by their metadata.

mod engine;
mod predicate;

pub use engine::{filter_listing, Listing};
pub use predicate::{parse_predicates, FilterPredicate, FILTER_KEYS};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The filter name is not one of [`FILTER_KEYS`].
    #[error("invalid argument '{0}'")]
    InvalidArgument(String),

    #[error("invalid value '{value}' for argument '{key}'")]
    InvalidValue { key: String, value: String },
}
