//! netctl error types

use std::path::PathBuf;

use datastore_client::DatastoreError;
use resources::ResourceError;
use thiserror::Error;

use crate::report::EXIT_INVALID_INPUT;

/// Why a batch stopped, or never started
#[derive(Debug, Error)]
pub enum BatchError {
    /// The input could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input could not be decoded into resources
    #[error(transparent)]
    Decode(#[from] ResourceError),

    /// The datastore rejected a resource
    #[error(transparent)]
    Datastore(#[from] DatastoreError),
}

/// Errors raised before any batch is run
#[derive(Debug, Error)]
pub enum CtlError {
    /// Client configuration could not be loaded
    #[error(transparent)]
    Config(#[from] anyhow::Error),

    /// The datastore client could not be built
    #[error("failed to create datastore client: {0}")]
    Client(#[from] DatastoreError),
}

impl CtlError {
    pub fn exit_code(&self) -> u8 {
        EXIT_INVALID_INPUT
    }
}
