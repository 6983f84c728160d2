//! Unit tests for default pool reconciliation

use super::*;
use crate::error::ValidationError;
use crate::test_utils::*;
use datastore_client::MockCall;

#[tokio::test]
async fn test_defaults_created_on_empty_datastore() {
    let client = empty_datastore();
    let created = configure_ip_pools(&BootstrapIntent::default(), &client).await.unwrap();

    assert_eq!(created.len(), 2);
    let pools = stored_pools(&client);
    assert_eq!(pools, created);

    assert_eq!(pools[0].cidr().to_string(), DEFAULT_IPV4_POOL_CIDR);
    assert_eq!(pools[0].ipip_mode(), IpipMode::Off);
    assert!(pools[0].nat_outgoing());

    assert_eq!(pools[1].cidr().to_string(), DEFAULT_IPV6_POOL_CIDR);
    assert_eq!(pools[1].ipip_mode(), IpipMode::Off);
    assert!(pools[1].nat_outgoing());
    assert!(!pools[1].disabled());
}

#[tokio::test]
async fn test_overrides_are_used() {
    let client = empty_datastore();
    let intent = intent(
        Some("172.16.0.0/24"),
        Some("fdff:ffff:ffff:ffff:ffff::/80"),
        None,
        false,
    );
    configure_ip_pools(&intent, &client).await.unwrap();

    let cidrs: Vec<String> = stored_pools(&client).iter().map(|p| p.cidr().to_string()).collect();
    assert_eq!(cidrs, vec!["172.16.0.0/24", "fdff:ffff:ffff:ffff:ffff::/80"]);
}

#[tokio::test]
async fn test_ipip_mode_only_applies_to_ipv4() {
    for (raw, mode) in [
        ("off", IpipMode::Off),
        ("always", IpipMode::Always),
        ("cross-subnet", IpipMode::CrossSubnet),
    ] {
        let client = empty_datastore();
        configure_ip_pools(&intent(None, None, Some(raw), false), &client)
            .await
            .unwrap();
        let pools = stored_pools(&client);
        assert_eq!(pools[0].ipip_mode(), mode);
        assert_eq!(pools[1].ipip_mode(), IpipMode::Off);
    }
}

#[tokio::test]
async fn test_skip_default_pools() {
    let client = empty_datastore();
    let created = configure_ip_pools(&intent(None, None, None, true), &client)
        .await
        .unwrap();
    assert!(created.is_empty());
    assert_eq!(client.mutating_calls(), 0);
    assert!(client.resources().is_empty());
}

#[tokio::test]
async fn test_skip_ignores_ipip_mode() {
    let client = empty_datastore();
    let created = configure_ip_pools(&intent(None, None, Some("badVal"), true), &client)
        .await
        .unwrap();
    assert!(created.is_empty());
}

#[tokio::test]
async fn test_skip_with_cidr_override_is_rejected_before_datastore() {
    for case in [
        intent(Some("172.16.0.0/24"), None, None, true),
        intent(None, Some("fdff:ffff:ffff:ffff:ffff::/80"), None, true),
    ] {
        let client = empty_datastore();
        assert!(matches!(
            configure_ip_pools(&case, &client).await,
            Err(StartupError::InvalidConfig(_))
        ));
        assert!(client.calls().is_empty());
    }
}

#[tokio::test]
async fn test_invalid_inputs_make_no_datastore_calls() {
    let cases = [
        intent(Some("172.16.0.0/27"), None, None, false),
        intent(Some("fdff:ffff:ffff:ffff:ffff::/80"), None, None, false),
        intent(None, Some("172.16.0.0/24"), None, false),
        intent(None, Some("fd00::/123"), None, false),
        intent(Some("172.16.0.0a/24"), None, None, false),
        intent(Some("0.0.0.0/0"), None, None, false),
        intent(None, None, Some("badVal"), false),
        intent(None, None, Some("Off"), false),
    ];
    for case in cases {
        let client = empty_datastore();
        let result = configure_ip_pools(&case, &client).await;
        assert!(
            matches!(result, Err(StartupError::Validation(_))),
            "{:?} should fail validation, got {:?}",
            case,
            result
        );
        assert!(client.calls().is_empty(), "{:?} touched the datastore", case);
    }
}

#[tokio::test]
async fn test_wrong_version_reports_expected_family() {
    let client = empty_datastore();
    let result = configure_ip_pools(&intent(None, Some("172.16.0.0/24"), None, false), &client).await;
    assert!(matches!(
        result,
        Err(StartupError::Validation(ValidationError::WrongVersion {
            expected: IpVersion::V6,
            ..
        }))
    ));
}

#[tokio::test]
async fn test_existing_ipv4_pool_only_creates_ipv6() {
    let client = datastore_with_pool("10.0.0.0/16");
    let created = configure_ip_pools(&BootstrapIntent::default(), &client).await.unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].version(), IpVersion::V6);
    let cidrs: Vec<String> = stored_pools(&client).iter().map(|p| p.cidr().to_string()).collect();
    assert_eq!(cidrs, vec!["10.0.0.0/16", DEFAULT_IPV6_POOL_CIDR]);
}

#[tokio::test]
async fn test_existing_pools_for_both_families_is_noop() {
    let client = datastore_with_pool("10.0.0.0/16");
    client
        .add_resource(
            IpPool::new("fd00::/64".parse().unwrap(), IpipMode::Off)
                .unwrap()
                .to_document(),
        )
        .unwrap();

    let created = configure_ip_pools(&BootstrapIntent::default(), &client).await.unwrap();
    assert!(created.is_empty());
    assert_eq!(client.mutating_calls(), 0);
    assert_eq!(client.calls(), vec![MockCall::List(ResourceKind::IpPool)]);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let client = empty_datastore();
    configure_ip_pools(&BootstrapIntent::default(), &client).await.unwrap();
    let created = configure_ip_pools(&BootstrapIntent::default(), &client).await.unwrap();
    assert!(created.is_empty());
    assert_eq!(client.resources().len(), 2);
}

#[tokio::test]
async fn test_list_failure_is_a_datastore_error() {
    let client = empty_datastore();
    client.fail_list("backend exploded");
    assert!(matches!(
        configure_ip_pools(&BootstrapIntent::default(), &client).await,
        Err(StartupError::Datastore(_))
    ));
    assert_eq!(client.mutating_calls(), 0);
}
