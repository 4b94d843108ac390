//! Request-level errors with HTTP-style status codes.

use thiserror::Error;

/// Outcome of a failed page or search request.
///
/// The message is what a visitor sees; details of the underlying failure
/// are logged, not exposed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// The raw page id does not name a page (404).
    #[error("{0}")]
    NotFound(String),

    /// The request itself is unusable (400).
    #[error("{0}")]
    InvalidInput(String),

    /// The document store could not be reached or failed (500).
    #[error("{0}")]
    FetchFailed(String),
}

impl PageError {
    pub fn status_code(&self) -> u16 {
        match self {
            PageError::NotFound(_) => 404,
            PageError::InvalidInput(_) => 400,
            PageError::FetchFailed(_) => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            PageError::NotFound(msg) | PageError::InvalidInput(msg) | PageError::FetchFailed(msg) => {
                msg
            }
        }
    }
}
