//! Error types for pagegraph.
//!
//! The derivation engine itself never fails: missing blocks, collections,
//! views or buckets degrade to empty results. These errors belong to the
//! edges of the system (parsing a record map, talking to the document store,
//! loading configuration).

use thiserror::Error;

/// Result type alias using pagegraph's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for pagegraph operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The document store has no page with this id
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
