//! Startup configuration.
//!
//! Read once from the environment at process start and immutable afterwards.
//! An unset or empty variable means "use the default", never an error.

use std::env;
use std::time::Duration;

use crate::autodetection::METHOD_FIRST_FOUND;
use crate::error::StartupError;
use crate::readiness::{DEFAULT_MAX_WAIT, DEFAULT_PROBE_INTERVAL};

pub const DEFAULT_DATASTORE_ENDPOINT: &str = "http://127.0.0.1:8080";

/// Default-pool intent derived from the environment.
///
/// CIDRs and the IPIP mode are kept raw; the pool reconciler validates them
/// before touching the datastore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapIntent {
    /// `IPV4POOL_CIDR`
    pub ipv4_cidr: Option<String>,
    /// `IPV6POOL_CIDR`
    pub ipv6_cidr: Option<String>,
    /// `IPV4POOL_IPIP`
    pub ipv4_ipip_mode: Option<String>,
    /// `NO_DEFAULT_POOLS=true`
    pub skip_default_pools: bool,
}

/// Everything node-startup needs to run
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub datastore_endpoint: String,
    pub datastore_token: Option<String>,
    pub probe_interval: Duration,
    pub max_wait: Duration,
    pub ipv4_autodetection_method: String,
    pub ipv6_autodetection_method: String,
    pub intent: BootstrapIntent,
}

impl StartupConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, so tests never touch the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let intent = BootstrapIntent {
            ipv4_cidr: get("IPV4POOL_CIDR"),
            ipv6_cidr: get("IPV6POOL_CIDR"),
            ipv4_ipip_mode: get("IPV4POOL_IPIP"),
            skip_default_pools: get("NO_DEFAULT_POOLS")
                .is_some_and(|value| value.eq_ignore_ascii_case("true")),
        };

        Ok(Self {
            datastore_endpoint: get("DATASTORE_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_DATASTORE_ENDPOINT.to_string()),
            datastore_token: get("DATASTORE_TOKEN"),
            probe_interval: seconds(&get, "DATASTORE_PROBE_INTERVAL_SECS", DEFAULT_PROBE_INTERVAL)?,
            max_wait: seconds(&get, "DATASTORE_MAX_WAIT_SECS", DEFAULT_MAX_WAIT)?,
            ipv4_autodetection_method: get("IP_AUTODETECTION_METHOD")
                .unwrap_or_else(|| METHOD_FIRST_FOUND.to_string()),
            ipv6_autodetection_method: get("IP6_AUTODETECTION_METHOD")
                .unwrap_or_else(|| METHOD_FIRST_FOUND.to_string()),
            intent,
        })
    }
}

/// Parse a positive whole number of seconds
fn seconds<G>(get: &G, key: &str, default: Duration) -> Result<Duration, StartupError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(StartupError::InvalidConfig(format!(
                "{} must be a positive number of seconds, got '{}'",
                key, raw
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<StartupConfig, StartupError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StartupConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.datastore_endpoint, DEFAULT_DATASTORE_ENDPOINT);
        assert_eq!(config.probe_interval, DEFAULT_PROBE_INTERVAL);
        assert_eq!(config.max_wait, DEFAULT_MAX_WAIT);
        assert_eq!(config.ipv4_autodetection_method, "first-found");
        assert_eq!(config.ipv6_autodetection_method, "first-found");
        assert_eq!(config.intent, BootstrapIntent::default());
    }

    #[test]
    fn test_pool_intent_from_environment() {
        let config = load(&[
            ("IPV4POOL_CIDR", "172.16.0.0/24"),
            ("IPV6POOL_CIDR", "fdff:ffff:ffff:ffff:ffff::/80"),
            ("IPV4POOL_IPIP", "cross-subnet"),
        ])
        .unwrap();
        assert_eq!(config.intent.ipv4_cidr.as_deref(), Some("172.16.0.0/24"));
        assert_eq!(config.intent.ipv6_cidr.as_deref(), Some("fdff:ffff:ffff:ffff:ffff::/80"));
        assert_eq!(config.intent.ipv4_ipip_mode.as_deref(), Some("cross-subnet"));
        assert!(!config.intent.skip_default_pools);
    }

    #[test]
    fn test_empty_values_mean_default() {
        let config = load(&[("IPV4POOL_CIDR", ""), ("NO_DEFAULT_POOLS", "")]).unwrap();
        assert_eq!(config.intent.ipv4_cidr, None);
        assert!(!config.intent.skip_default_pools);
    }

    #[test]
    fn test_no_default_pools_is_case_insensitive() {
        assert!(load(&[("NO_DEFAULT_POOLS", "TRUE")]).unwrap().intent.skip_default_pools);
        assert!(!load(&[("NO_DEFAULT_POOLS", "yes")]).unwrap().intent.skip_default_pools);
    }

    #[test]
    fn test_invalid_probe_interval() {
        assert!(matches!(
            load(&[("DATASTORE_PROBE_INTERVAL_SECS", "0")]),
            Err(StartupError::InvalidConfig(_))
        ));
        assert!(matches!(
            load(&[("DATASTORE_MAX_WAIT_SECS", "soon")]),
            Err(StartupError::InvalidConfig(_))
        ));
        assert_eq!(
            load(&[("DATASTORE_MAX_WAIT_SECS", "12")]).unwrap().max_wait,
            Duration::from_secs(12)
        );
    }
}
