//! Datastore client errors

use resources::ResourceError;
use thiserror::Error;

/// Errors that can occur when talking to the datastore
#[derive(Debug, Error)]
pub enum DatastoreError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The datastore could not be reached (connection refused, timeout, not ready)
    #[error("datastore unreachable: {0}")]
    Unreachable(String),

    /// The datastore returned an error
    #[error("datastore API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (missing or rejected token)
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A create was attempted for a resource that already exists
    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    /// Resource not found
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The datastore rejected the resource as invalid
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The resource could not be identified
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

impl DatastoreError {
    /// True for errors the readiness gate should keep retrying
    pub fn is_unreachable(&self) -> bool {
        match self {
            DatastoreError::Unreachable(_) => true,
            DatastoreError::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
