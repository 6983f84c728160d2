//! IP autodetection method validation.
//!
//! The node agent picks its own address later; here we only make sure the
//! configured method can work, so a typo fails startup instead of the agent.

use std::fmt;
use std::io;
use std::net::IpAddr;

use async_trait::async_trait;
use regex::Regex;
use resources::IpVersion;
use tracing::debug;

use crate::error::ValidationError;

pub const METHOD_FIRST_FOUND: &str = "first-found";
pub const METHOD_CAN_REACH: &str = "can-reach=";
pub const METHOD_INTERFACE: &str = "interface=";

/// A validated autodetection method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutodetectionMethod {
    /// Use the first usable address on any interface
    FirstFound,
    /// Use the address of the interface that routes to this target
    CanReach(String),
    /// Use the first address on an interface whose name matches this regex
    InterfacePattern(String),
}

impl fmt::Display for AutodetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutodetectionMethod::FirstFound => f.write_str(METHOD_FIRST_FOUND),
            AutodetectionMethod::CanReach(target) => write!(f, "{}{}", METHOD_CAN_REACH, target),
            AutodetectionMethod::InterfacePattern(pattern) => write!(f, "{}{}", METHOD_INTERFACE, pattern),
        }
    }
}

/// Hostname resolution, behind a trait so tests never hit real DNS
#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the system resolver
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

#[async_trait]
impl AddressResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(addr) = host.parse::<IpAddr>() {
            return Ok(vec![addr]);
        }
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Validate an autodetection method for one address family.
///
/// Empty input means `first-found`.
pub async fn validate_method(
    raw: &str,
    version: IpVersion,
    resolver: &dyn AddressResolver,
) -> Result<AutodetectionMethod, ValidationError> {
    if raw.is_empty() || raw == METHOD_FIRST_FOUND {
        return Ok(AutodetectionMethod::FirstFound);
    }

    if let Some(target) = raw.strip_prefix(METHOD_CAN_REACH) {
        let addrs = resolver
            .resolve(target)
            .await
            .map_err(|e| ValidationError::UnresolvableTarget {
                target: target.to_string(),
                reason: e.to_string(),
            })?;
        if addrs.is_empty() {
            return Err(ValidationError::UnresolvableTarget {
                target: target.to_string(),
                reason: "no addresses returned".to_string(),
            });
        }
        if !addrs.iter().any(|addr| IpVersion::of_addr(addr) == version) {
            return Err(ValidationError::NoMatchingAddress {
                target: target.to_string(),
                version,
            });
        }
        debug!("{} target {} resolved to {:?}", version, target, addrs);
        return Ok(AutodetectionMethod::CanReach(target.to_string()));
    }

    if let Some(pattern) = raw.strip_prefix(METHOD_INTERFACE) {
        Regex::new(pattern).map_err(|source| ValidationError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        return Ok(AutodetectionMethod::InterfacePattern(pattern.to_string()));
    }

    Err(ValidationError::UnknownMethod(raw.to_string()))
}
