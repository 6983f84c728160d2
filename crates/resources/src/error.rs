//! Resource model errors

use thiserror::Error;

use crate::kind::ResourceKind;

/// Errors raised while decoding or interpreting resource documents
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The input could not be parsed as YAML or JSON
    #[error("failed to decode resources: {0}")]
    Decode(#[from] serde_yaml::Error),

    /// A document declared an apiVersion this tool does not understand
    #[error("unsupported apiVersion '{found}' (expected '{expected}')")]
    UnsupportedApiVersion { found: String, expected: String },

    /// A kind string did not match any known resource type
    #[error("unknown resource type '{0}'")]
    UnknownKind(String),

    /// A document is missing one of the metadata fields that identify it
    #[error("{kind} resource is missing identifying field '{field}'")]
    MissingIdentifier { kind: ResourceKind, field: &'static str },

    /// The spec of a typed resource could not be interpreted
    #[error("invalid {kind} resource: {message}")]
    InvalidSpec { kind: ResourceKind, message: String },
}
