//! Test helpers for the bootstrap tests

use datastore_client::MockDatastoreClient;
use resources::{IpPool, IpipMode};

use crate::config::BootstrapIntent;

/// Reachable, empty mock datastore
pub fn empty_datastore() -> MockDatastoreClient {
    MockDatastoreClient::new("http://datastore.test")
}

/// Mock datastore already holding a pool for `cidr`
pub fn datastore_with_pool(cidr: &str) -> MockDatastoreClient {
    let client = empty_datastore();
    let pool = IpPool::new(cidr.parse().expect("test CIDR"), IpipMode::Off).expect("test pool");
    client
        .add_resource(pool.to_document())
        .expect("pool document has a cidr");
    client
}

/// Intent built from optional overrides
pub fn intent(
    ipv4_cidr: Option<&str>,
    ipv6_cidr: Option<&str>,
    ipv4_ipip_mode: Option<&str>,
    skip_default_pools: bool,
) -> BootstrapIntent {
    BootstrapIntent {
        ipv4_cidr: ipv4_cidr.map(str::to_string),
        ipv6_cidr: ipv6_cidr.map(str::to_string),
        ipv4_ipip_mode: ipv4_ipip_mode.map(str::to_string),
        skip_default_pools,
    }
}

/// Stored pools, decoded
pub fn stored_pools(client: &MockDatastoreClient) -> Vec<IpPool> {
    client
        .resources_of(resources::ResourceKind::IpPool)
        .iter()
        .map(|doc| IpPool::from_document(doc).expect("stored pool decodes"))
        .collect()
}
