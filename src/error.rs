//! Error taxonomy surfaced to callers of the search client.

use std::time::Duration;
use thiserror::Error;

use crate::resilience::circuit_breaker::BreakerError;

/// Errors that can occur while searching the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Transport-level failure (connect, non-success status, undecodable body).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The remote call did not complete before its deadline.
    #[error("Request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// The catalog service answered with an application-level error.
    #[error("Remote API error: {message}")]
    RemoteApi { message: String, code: Option<i64> },

    /// The query resolved to zero artists.
    #[error("Artist not found: {0}")]
    NotFound(String),

    /// The circuit breaker rejected the call without attempting it.
    #[error("Service temporarily unavailable, retry in {remaining_secs} seconds")]
    CircuitOpen { remaining_secs: u64 },

    /// The query was empty after trimming.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl SearchError {
    /// True when the breaker short-circuited the call.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, SearchError::CircuitOpen { .. })
    }

    /// Short machine-friendly label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::Connection(_) => "connection",
            SearchError::Timeout(_) => "timeout",
            SearchError::RemoteApi { .. } => "remote_api",
            SearchError::NotFound(_) => "not_found",
            SearchError::CircuitOpen { .. } => "circuit_open",
            SearchError::InvalidQuery(_) => "invalid_query",
        }
    }
}

impl From<BreakerError<SearchError>> for SearchError {
    fn from(err: BreakerError<SearchError>) -> Self {
        match err {
            BreakerError::Open(open) => SearchError::CircuitOpen {
                remaining_secs: open.remaining_secs,
            },
            BreakerError::Operation(e) => e,
        }
    }
}

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors raised while building a search client.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("Failed to build HTTP client: {0}")]
    Transport(#[from] crate::remote::TransportError),
}
