//! Resource metadata and primary identifiers
//!
//! Metadata holds the identifying fields of a resource. Which fields are
//! required depends on the kind; a [`ResourceKey`] is the kind plus the
//! joined identifying values and is what "already exists" is decided on.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kind::ResourceKind;

/// Identifying metadata shared by every resource kind.
///
/// Also used as a list selector: fields left as `None` are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Node (host) the resource belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,

    /// Orchestrator that owns a workload endpoint (e.g. "k8s", "docker")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestrator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload: Option<String>,

    /// BGP peer scope, "global" or "node"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(rename = "peerIP", default, skip_serializing_if = "Option::is_none")]
    pub peer_ip: Option<String>,

    /// Pool CIDR (ipPool only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl ResourceMetadata {
    /// Metadata identifying a named resource
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Metadata identifying an IP pool
    pub fn pool(cidr: impl Into<String>) -> Self {
        Self {
            cidr: Some(cidr.into()),
            ..Default::default()
        }
    }

    /// Returns true if every field set on `selector` has the same value here.
    ///
    /// Labels are not part of the identity and are ignored.
    pub fn matches(&self, selector: &ResourceMetadata) -> bool {
        fn field_matches(value: &Option<String>, wanted: &Option<String>) -> bool {
            match wanted {
                Some(wanted) => value.as_deref() == Some(wanted.as_str()),
                None => true,
            }
        }

        field_matches(&self.name, &selector.name)
            && field_matches(&self.node, &selector.node)
            && field_matches(&self.orchestrator, &selector.orchestrator)
            && field_matches(&self.workload, &selector.workload)
            && field_matches(&self.scope, &selector.scope)
            && field_matches(&self.peer_ip, &selector.peer_ip)
            && field_matches(&self.cidr, &selector.cidr)
    }

    /// Query parameters for the set fields, in a stable order
    pub fn selector_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("name", &self.name),
            ("node", &self.node),
            ("orchestrator", &self.orchestrator),
            ("workload", &self.workload),
            ("scope", &self.scope),
            ("peerIP", &self.peer_ip),
            ("cidr", &self.cidr),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}

/// Primary identifier of a resource: its kind plus the identifying metadata
/// values joined with `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
    pub kind: ResourceKind,
    pub id: String,
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.id)
    }
}
