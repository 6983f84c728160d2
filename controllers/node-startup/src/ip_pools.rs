//! Default IP pool reconciliation.
//!
//! At startup each address family gets a default pool unless one already
//! exists. Every input is validated before the first mutating call, so a bad
//! setting never leaves a half-configured datastore behind.

use std::net::IpAddr;

use datastore_client::DatastoreClientTrait;
use ipnet::IpNet;
use resources::{IpPool, IpVersion, IpipMode, ResourceDocument, ResourceKind, ResourceMetadata};
use tracing::{debug, error, info, warn};

use crate::config::BootstrapIntent;
use crate::error::StartupError;
use crate::validation::{validate_cidr, validate_ipip_mode};

pub const DEFAULT_IPV4_POOL_CIDR: &str = "192.168.0.0/16";
pub const DEFAULT_IPV6_POOL_CIDR: &str = "fd80:24e2:f998:72d6::/64";

/// Pools to create if their family has none yet
#[derive(Debug)]
struct DesiredPools {
    ipv4: IpPool,
    ipv6: IpPool,
}

/// Create any missing default pools.
///
/// Returns the pools that were applied, in v4, v6 order.
pub async fn configure_ip_pools(
    intent: &BootstrapIntent,
    client: &dyn DatastoreClientTrait,
) -> Result<Vec<IpPool>, StartupError> {
    if intent.skip_default_pools && (intent.ipv4_cidr.is_some() || intent.ipv6_cidr.is_some()) {
        let error_msg =
            "default pool creation is disabled but an IPv4 or IPv6 pool CIDR was also set".to_string();
        error!("{}", error_msg);
        return Err(StartupError::InvalidConfig(error_msg));
    }

    let desired = if intent.skip_default_pools {
        None
    } else {
        Some(desired_pools(intent)?)
    };

    let existing = client.list(ResourceKind::IpPool, &ResourceMetadata::default()).await?;
    debug!("Found {} existing IP pool(s)", existing.len());

    let Some(desired) = desired else {
        info!("Skipping default IP pool creation");
        return Ok(Vec::new());
    };

    let mut has_ipv4 = false;
    let mut has_ipv6 = false;
    for document in &existing {
        match existing_version(document) {
            Some(IpVersion::V4) => has_ipv4 = true,
            Some(IpVersion::V6) => has_ipv6 = true,
            None => warn!("Ignoring IP pool with unreadable CIDR: {:?}", document.metadata.cidr),
        }
    }

    let mut created = Vec::new();
    for (pool, exists) in [(desired.ipv4, has_ipv4), (desired.ipv6, has_ipv6)] {
        if exists {
            debug!("{} pool already present, not creating {}", pool.version(), pool.cidr());
            continue;
        }
        info!(
            "Creating default {} pool {} (ipip: {}, nat-outgoing: {})",
            pool.version(),
            pool.cidr(),
            pool.ipip_mode(),
            pool.nat_outgoing()
        );
        client.apply(&pool.to_document()).await?;
        created.push(pool);
    }

    Ok(created)
}

fn desired_pools(intent: &BootstrapIntent) -> Result<DesiredPools, StartupError> {
    let ipv4_cidr = validate_cidr(
        intent.ipv4_cidr.as_deref().unwrap_or(DEFAULT_IPV4_POOL_CIDR),
        IpVersion::V4,
    )?;
    let ipv6_cidr = validate_cidr(
        intent.ipv6_cidr.as_deref().unwrap_or(DEFAULT_IPV6_POOL_CIDR),
        IpVersion::V6,
    )?;
    let ipv4_mode = match intent.ipv4_ipip_mode.as_deref() {
        Some(raw) => validate_ipip_mode(raw)?,
        None => IpipMode::Off,
    };
    if ipv4_mode.is_enabled() {
        info!("IPIP mode '{}' applies to the IPv4 pool only, IPv6 pool keeps IPIP off", ipv4_mode);
    }

    Ok(DesiredPools {
        ipv4: IpPool::new(ipv4_cidr, ipv4_mode)?.with_nat_outgoing(true),
        // IPIP never applies to IPv6
        ipv6: IpPool::new(ipv6_cidr, IpipMode::Off)?.with_nat_outgoing(true),
    })
}

/// Address family of a stored pool, from its identifying CIDR
fn existing_version(document: &ResourceDocument) -> Option<IpVersion> {
    let cidr = document.metadata.cidr.as_deref()?;
    if let Ok(net) = cidr.parse::<IpNet>() {
        return Some(IpVersion::of_net(&net));
    }
    cidr.parse::<IpAddr>().ok().map(|addr| IpVersion::of_addr(&addr))
}

#[cfg(test)]
#[path = "ip_pools_test.rs"]
mod ip_pools_test;
