//! Check error types.

use thiserror::Error;

/// Why the remote membership view could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection failure, timeout, or a status of 400 or above.
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// The peer answered but the body is not a membership snapshot.
    #[error("malformed membership response: {0}")]
    ParseError(String),
}

/// Errors that abort a single check cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

pub type FetchResult<T> = Result<T, FetchError>;
pub type CheckResult<T> = Result<T, CheckError>;
