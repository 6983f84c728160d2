//! IP pool resources
//!
//! Typed view over `ipPool` documents. A pool is a CIDR from which workload
//! addresses are allocated, plus its IP-in-IP encapsulation policy.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::ResourceDocument;
use crate::error::ResourceError;
use crate::kind::ResourceKind;
use crate::metadata::ResourceMetadata;

/// IP address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Family of an address
    pub fn of_addr(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }

    /// Family of a network
    pub fn of_net(net: &IpNet) -> Self {
        match net {
            IpNet::V4(_) => IpVersion::V4,
            IpNet::V6(_) => IpVersion::V6,
        }
    }

    /// 4 or 6
    pub fn number(&self) -> u8 {
        match self {
            IpVersion::V4 => 4,
            IpVersion::V6 => 6,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IPv{}", self.number())
    }
}

/// IP-in-IP encapsulation mode of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IpipMode {
    /// No encapsulation
    #[default]
    Off,
    /// Encapsulate all traffic leaving the pool
    Always,
    /// Encapsulate only traffic crossing a subnet boundary
    CrossSubnet,
}

/// Returned when a string is not one of `off`, `always`, `cross-subnet`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown IPIP mode '{0}' (expected one of: off, always, cross-subnet)")]
pub struct ParseIpipModeError(pub String);

impl IpipMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpipMode::Off => "off",
            IpipMode::Always => "always",
            IpipMode::CrossSubnet => "cross-subnet",
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self != IpipMode::Off
    }
}

impl fmt::Display for IpipMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IpipMode {
    type Err = ParseIpipModeError;

    /// Case-sensitive: `Off` and `cross_subnet` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(IpipMode::Off),
            "always" => Ok(IpipMode::Always),
            "cross-subnet" => Ok(IpipMode::CrossSubnet),
            other => Err(ParseIpipModeError(other.to_string())),
        }
    }
}

/// Wire form of the `ipip` block of a pool spec
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IpipSpec {
    #[serde(default)]
    enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mode: Option<IpipMode>,
}

/// Wire form of a pool spec
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IpPoolSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ipip: Option<IpipSpec>,
    #[serde(rename = "nat-outgoing", default)]
    nat_outgoing: bool,
    #[serde(default)]
    disabled: bool,
}

/// An address pool.
///
/// Invariant: an IPv6 pool never has IPIP enabled. The CIDR is always stored
/// with host bits cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpPool {
    cidr: IpNet,
    ipip_mode: IpipMode,
    nat_outgoing: bool,
    disabled: bool,
}

impl IpPool {
    /// Create an enabled pool without NAT-outgoing.
    ///
    /// Rejects IPIP on an IPv6 CIDR.
    pub fn new(cidr: IpNet, ipip_mode: IpipMode) -> Result<Self, ResourceError> {
        if IpVersion::of_net(&cidr) == IpVersion::V6 && ipip_mode.is_enabled() {
            return Err(ResourceError::InvalidSpec {
                kind: ResourceKind::IpPool,
                message: format!("IPIP mode '{}' is not supported on IPv6 pool {}", ipip_mode, cidr),
            });
        }
        Ok(Self {
            cidr: cidr.trunc(),
            ipip_mode,
            nat_outgoing: false,
            disabled: false,
        })
    }

    #[must_use]
    pub fn with_nat_outgoing(mut self, nat_outgoing: bool) -> Self {
        self.nat_outgoing = nat_outgoing;
        self
    }

    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn cidr(&self) -> IpNet {
        self.cidr
    }

    pub fn ipip_mode(&self) -> IpipMode {
        self.ipip_mode
    }

    pub fn nat_outgoing(&self) -> bool {
        self.nat_outgoing
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn version(&self) -> IpVersion {
        IpVersion::of_net(&self.cidr)
    }

    /// Render as an `ipPool` document. The `ipip` block is omitted when off.
    pub fn to_document(&self) -> ResourceDocument {
        let mut spec = serde_json::json!({
            "nat-outgoing": self.nat_outgoing,
            "disabled": self.disabled,
        });
        if self.ipip_mode.is_enabled() {
            spec["ipip"] = serde_json::json!({
                "enabled": true,
                "mode": self.ipip_mode.as_str(),
            });
        }
        ResourceDocument::new(
            ResourceKind::IpPool,
            ResourceMetadata::pool(self.cidr.to_string()),
            spec,
        )
    }

    /// Interpret an `ipPool` document.
    ///
    /// An `ipip` block that is enabled without a mode means `always`.
    pub fn from_document(document: &ResourceDocument) -> Result<Self, ResourceError> {
        let invalid = |message: String| ResourceError::InvalidSpec {
            kind: ResourceKind::IpPool,
            message,
        };

        if document.kind != ResourceKind::IpPool {
            return Err(invalid(format!("expected an ipPool document, found {}", document.kind)));
        }
        let raw_cidr = document
            .metadata
            .cidr
            .as_deref()
            .ok_or(ResourceError::MissingIdentifier {
                kind: ResourceKind::IpPool,
                field: "cidr",
            })?;
        let cidr: IpNet = raw_cidr
            .parse()
            .map_err(|_| invalid(format!("invalid pool CIDR '{}'", raw_cidr)))?;

        let spec: IpPoolSpec = if document.spec.is_null() {
            IpPoolSpec::default()
        } else {
            serde_json::from_value(document.spec.clone()).map_err(|e| invalid(e.to_string()))?
        };
        let ipip_mode = match spec.ipip {
            Some(IpipSpec { enabled: true, mode }) => mode.unwrap_or(IpipMode::Always),
            _ => IpipMode::Off,
        };

        Ok(IpPool::new(cidr, ipip_mode)?
            .with_nat_outgoing(spec.nat_outgoing)
            .with_disabled(spec.disabled))
    }
}
