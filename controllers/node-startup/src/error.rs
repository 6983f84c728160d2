//! Node bootstrap error types.
//!
//! Validation errors are raised before any datastore call is made.
//! [`StartupError::exit_code`] maps every failure to the process exit status
//! so the caller can tell configuration problems from datastore problems.

use std::time::Duration;

use datastore_client::DatastoreError;
use resources::{IpVersion, ParseIpipModeError, ResourceError};
use thiserror::Error;

/// Exit status for configuration and validation errors
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit status when the datastore never became reachable
pub const EXIT_DATASTORE_UNAVAILABLE: u8 = 2;
/// Exit status for a datastore call that failed after the datastore was reachable
pub const EXIT_DATASTORE_ERROR: u8 = 3;

/// Rejected bootstrap input.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Not parseable as a network prefix
    #[error("invalid CIDR '{0}'")]
    InvalidFormat(String),

    /// Parsed, but the address family is not the one the field requires
    #[error("'{raw}' is not an {expected} CIDR")]
    WrongVersion { raw: String, expected: IpVersion },

    /// Fewer addresses than the minimum pool size, or a single host
    #[error("CIDR '{raw}' is too small for a pool: {size} address(es), minimum is {minimum}")]
    TooSmall { raw: String, size: u128, minimum: u32 },

    /// Pools may not overlap 169.254.0.0/16 or fe80::/10
    #[error("CIDR '{0}' overlaps the link-local range")]
    OverlapsLinkLocal(String),

    #[error(transparent)]
    UnknownMode(#[from] ParseIpipModeError),

    #[error("invalid IP autodetection method: {0}")]
    UnknownMethod(String),

    #[error("cannot resolve address specified for IP autodetection: {target}: {reason}")]
    UnresolvableTarget { target: String, reason: String },

    #[error("address for IP autodetection does not resolve to an {version} address: {target}")]
    NoMatchingAddress { target: String, version: IpVersion },

    #[error("invalid interface regex specified for IP autodetection: {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors that abort node startup.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Bad pool or autodetection setting
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Invalid configuration, including conflicting settings
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A pool could not be built from validated settings
    #[error("Invalid pool: {0}")]
    Pool(#[from] ResourceError),

    /// The readiness gate gave up
    #[error("Timed out after {waited:?} ({attempts} probe(s)) waiting for datastore at {endpoint}")]
    DatastoreTimeout {
        endpoint: String,
        waited: Duration,
        attempts: u32,
    },

    /// Datastore call failed
    #[error("Datastore error: {0}")]
    Datastore(#[from] DatastoreError),
}

impl StartupError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            StartupError::Validation(_) | StartupError::InvalidConfig(_) | StartupError::Pool(_) => {
                EXIT_CONFIG_ERROR
            }
            StartupError::DatastoreTimeout { .. } => EXIT_DATASTORE_UNAVAILABLE,
            StartupError::Datastore(_) => EXIT_DATASTORE_ERROR,
        }
    }
}
