//! Resource documents
//!
//! A [`ResourceDocument`] is one decoded entry of a resource file: the unit
//! that `create`/`apply` hand to the datastore.

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::error::ResourceError;
use crate::kind::ResourceKind;
use crate::metadata::{ResourceKey, ResourceMetadata};

/// The only document API version understood by this tool
pub const API_VERSION: &str = "v1";

/// A declarative resource: kind tag, identifying metadata and a specification.
///
/// The spec is kept as untyped JSON so that every kind can be stored and
/// replaced without this crate modelling each schema. Typed views exist for
/// the kinds the bootstrap logic needs (see [`crate::IpPool`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDocument {
    pub api_version: String,
    pub kind: ResourceKind,
    #[serde(default)]
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub spec: serde_json::Value,
}

impl ResourceDocument {
    /// Create a `v1` document
    pub fn new(kind: ResourceKind, metadata: ResourceMetadata, spec: serde_json::Value) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind,
            metadata,
            spec,
        }
    }

    /// Primary identifier of this resource.
    ///
    /// Fails if a field required for the kind is missing. Pool CIDRs are
    /// canonicalised so `10.0.0.1/24` and `10.0.0.0/24` identify the same pool.
    pub fn key(&self) -> Result<ResourceKey, ResourceError> {
        let meta = &self.metadata;
        let kind = self.kind;
        let required = |value: &Option<String>, field: &'static str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or(ResourceError::MissingIdentifier { kind, field })
        };

        let parts = match kind {
            ResourceKind::Node | ResourceKind::Policy | ResourceKind::Profile => {
                vec![required(&meta.name, "name")?]
            }
            ResourceKind::HostEndpoint => {
                vec![required(&meta.node, "node")?, required(&meta.name, "name")?]
            }
            ResourceKind::WorkloadEndpoint => vec![
                required(&meta.node, "node")?,
                required(&meta.orchestrator, "orchestrator")?,
                required(&meta.workload, "workload")?,
                required(&meta.name, "name")?,
            ],
            ResourceKind::BgpPeer => {
                let scope = required(&meta.scope, "scope")?;
                let peer_ip = required(&meta.peer_ip, "peerIP")?;
                if scope == "node" {
                    vec![scope, required(&meta.node, "node")?, peer_ip]
                } else {
                    vec![scope, peer_ip]
                }
            }
            ResourceKind::IpPool => {
                let cidr = required(&meta.cidr, "cidr")?;
                let net: IpNet = cidr.parse().map_err(|_| ResourceError::InvalidSpec {
                    kind,
                    message: format!("invalid pool CIDR '{}'", cidr),
                })?;
                vec![net.trunc().to_string()]
            }
        };

        Ok(ResourceKey {
            kind,
            id: parts.join("/"),
        })
    }
}

/// Collection wrapper returned by the datastore list endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceList {
    #[serde(default)]
    pub items: Vec<ResourceDocument>,
}
