//! Startup sequence against an injected datastore client and resolver.
//!
//! Order matters: autodetection methods are checked before the datastore is
//! touched, and the readiness gate completes before any pool is listed or
//! applied.

use datastore_client::DatastoreClientTrait;
use resources::IpVersion;
use tracing::info;

use crate::autodetection::{validate_method, AddressResolver};
use crate::config::StartupConfig;
use crate::error::StartupError;
use crate::ip_pools::configure_ip_pools;
use crate::readiness::wait_for_connection;

pub async fn bootstrap(
    config: &StartupConfig,
    client: &dyn DatastoreClientTrait,
    resolver: &dyn AddressResolver,
) -> Result<(), StartupError> {
    let ipv4_method = validate_method(&config.ipv4_autodetection_method, IpVersion::V4, resolver).await?;
    let ipv6_method = validate_method(&config.ipv6_autodetection_method, IpVersion::V6, resolver).await?;
    info!("Using autodetection methods {} (IPv4) and {} (IPv6)", ipv4_method, ipv6_method);

    wait_for_connection(client, config.probe_interval, config.max_wait).await?;

    let created = configure_ip_pools(&config.intent, client).await?;
    info!("Created {} default IP pool(s)", created.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodetection::SystemResolver;
    use crate::error::{EXIT_CONFIG_ERROR, EXIT_DATASTORE_UNAVAILABLE};
    use crate::test_utils::empty_datastore;
    use datastore_client::MockCall;
    use resources::ResourceKind;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> StartupConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StartupConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_datastore_sees_only_probes() {
        let client = empty_datastore();
        client.set_never_reachable();
        let config = config(&[("DATASTORE_MAX_WAIT_SECS", "5")]);

        let err = bootstrap(&config, &client, &SystemResolver).await.unwrap_err();

        assert!(matches!(err, StartupError::DatastoreTimeout { .. }));
        assert_eq!(err.exit_code(), EXIT_DATASTORE_UNAVAILABLE);
        let calls = client.calls();
        assert!(!calls.is_empty());
        assert!(calls.iter().all(|call| *call == MockCall::Probe), "{:?}", calls);
    }

    #[tokio::test]
    async fn test_invalid_autodetection_method_makes_no_datastore_calls() {
        for (key, value) in [
            ("IP_AUTODETECTION_METHOD", "first_found"),
            ("IP6_AUTODETECTION_METHOD", "interface=eth["),
        ] {
            let client = empty_datastore();
            let config = config(&[(key, value)]);

            let err = bootstrap(&config, &client, &SystemResolver).await.unwrap_err();

            assert!(matches!(err, StartupError::Validation(_)));
            assert_eq!(err.exit_code(), EXIT_CONFIG_ERROR);
            assert!(client.calls().is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_runs_before_pool_reconciliation() {
        let client = empty_datastore();
        client.set_unreachable_for(2);

        bootstrap(&config(&[]), &client, &SystemResolver).await.unwrap();

        let calls = client.calls();
        assert_eq!(&calls[..3], &[MockCall::Probe, MockCall::Probe, MockCall::Probe]);
        assert_eq!(calls[3], MockCall::List(ResourceKind::IpPool));
        assert_eq!(client.resources_of(ResourceKind::IpPool).len(), 2);
    }
}
