//! Resource kinds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResourceError;

/// The resource types managed through the datastore.
///
/// Documents carry the canonical camelCase name (`ipPool`, `bgpPeer`, ...)
/// and deserialize against it exactly. Command-line parsing through
/// [`FromStr`] is looser: case-insensitive with plural forms accepted, so
/// `IPPools` and `ippool` both resolve to [`ResourceKind::IpPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Node,
    BgpPeer,
    HostEndpoint,
    WorkloadEndpoint,
    IpPool,
    Policy,
    Profile,
}

impl ResourceKind {
    /// All kinds, in the order they are listed in help output
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Node,
        ResourceKind::BgpPeer,
        ResourceKind::HostEndpoint,
        ResourceKind::WorkloadEndpoint,
        ResourceKind::IpPool,
        ResourceKind::Policy,
        ResourceKind::Profile,
    ];

    /// Canonical name as it appears in a document's `kind` field
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Node => "node",
            ResourceKind::BgpPeer => "bgpPeer",
            ResourceKind::HostEndpoint => "hostEndpoint",
            ResourceKind::WorkloadEndpoint => "workloadEndpoint",
            ResourceKind::IpPool => "ipPool",
            ResourceKind::Policy => "policy",
            ResourceKind::Profile => "profile",
        }
    }

    /// Collection segment used by the datastore REST API
    pub fn api_path(&self) -> &'static str {
        match self {
            ResourceKind::Node => "nodes",
            ResourceKind::BgpPeer => "bgppeers",
            ResourceKind::HostEndpoint => "hostendpoints",
            ResourceKind::WorkloadEndpoint => "workloadendpoints",
            ResourceKind::IpPool => "ippools",
            ResourceKind::Policy => "policies",
            ResourceKind::Profile => "profiles",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        ResourceKind::ALL
            .into_iter()
            .find(|kind| {
                let singular = kind.as_str().to_ascii_lowercase();
                lowered == singular || lowered == kind.api_path()
            })
            .ok_or_else(|| ResourceError::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive_and_accepts_plurals() {
        assert_eq!("ipPool".parse::<ResourceKind>().unwrap(), ResourceKind::IpPool);
        assert_eq!("IPPOOLS".parse::<ResourceKind>().unwrap(), ResourceKind::IpPool);
        assert_eq!("policies".parse::<ResourceKind>().unwrap(), ResourceKind::Policy);
        assert_eq!("BGPPeer".parse::<ResourceKind>().unwrap(), ResourceKind::BgpPeer);
    }

    #[test]
    fn test_parse_unknown_kind() {
        let err = "router".parse::<ResourceKind>().unwrap_err();
        assert!(matches!(err, ResourceError::UnknownKind(ref k) if k == "router"));
    }

    #[test]
    fn test_serializes_canonical_name() {
        let json = serde_json::to_string(&ResourceKind::WorkloadEndpoint).unwrap();
        assert_eq!(json, "\"workloadEndpoint\"");
    }

    #[test]
    fn test_deserialize_accepts_only_canonical_name() {
        let kind: ResourceKind = serde_json::from_str("\"ipPool\"").unwrap();
        assert_eq!(kind, ResourceKind::IpPool);
        for loose in ["\"ipPools\"", "\"IPPOOL\"", "\"ippool\""] {
            assert!(serde_json::from_str::<ResourceKind>(loose).is_err(), "{} accepted", loose);
        }
    }
}
