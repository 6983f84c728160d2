//! Pool CIDR and IPIP mode validation.
//!
//! Pure functions: nothing here talks to the datastore.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::IpNet;
use resources::{IpVersion, IpipMode};

use crate::error::ValidationError;

/// Smallest usable pool, in addresses (/26 for IPv4, /122 for IPv6)
pub const MIN_POOL_SIZE: u32 = 64;

/// Validate a pool CIDR for the given address family.
///
/// Returns the canonical network (host bits cleared).
pub fn validate_cidr(raw: &str, expected: IpVersion) -> Result<IpNet, ValidationError> {
    let net = match raw.parse::<IpNet>() {
        Ok(net) => net,
        Err(_) => {
            // A bare address is a legal host but never a usable pool
            let addr: IpAddr = raw
                .parse()
                .map_err(|_| ValidationError::InvalidFormat(raw.to_string()))?;
            check_version(raw, IpVersion::of_addr(&addr), expected)?;
            return Err(ValidationError::TooSmall {
                raw: raw.to_string(),
                size: 1,
                minimum: MIN_POOL_SIZE,
            });
        }
    };
    check_version(raw, IpVersion::of_net(&net), expected)?;

    let size = pool_size(&net);
    if size < u128::from(MIN_POOL_SIZE) {
        return Err(ValidationError::TooSmall {
            raw: raw.to_string(),
            size,
            minimum: MIN_POOL_SIZE,
        });
    }

    if overlaps_link_local(&net) {
        return Err(ValidationError::OverlapsLinkLocal(raw.to_string()));
    }

    Ok(net.trunc())
}

/// Validate an IPIP mode string. Exactly `off`, `always` or `cross-subnet`.
pub fn validate_ipip_mode(raw: &str) -> Result<IpipMode, ValidationError> {
    Ok(raw.parse::<IpipMode>()?)
}

fn check_version(raw: &str, found: IpVersion, expected: IpVersion) -> Result<(), ValidationError> {
    if found == expected {
        Ok(())
    } else {
        Err(ValidationError::WrongVersion {
            raw: raw.to_string(),
            expected,
        })
    }
}

/// Number of addresses in `net`, saturating for ::/0
fn pool_size(net: &IpNet) -> u128 {
    let host_bits = u32::from(net.max_prefix_len() - net.prefix_len());
    1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
}

fn overlaps_link_local(net: &IpNet) -> bool {
    match net {
        IpNet::V4(n) => n.network().is_link_local() || n.contains(&Ipv4Addr::new(169, 254, 0, 0)),
        IpNet::V6(n) => {
            n.network().is_unicast_link_local() || n.contains(&Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ipv4_pools() {
        for raw in ["172.16.0.0/24", "10.0.0.0/26", "192.168.0.0/16", "10.0.0.0/8"] {
            let net = validate_cidr(raw, IpVersion::V4).unwrap();
            assert_eq!(IpVersion::of_net(&net), IpVersion::V4);
            assert_eq!(net.to_string(), raw);
        }
    }

    #[test]
    fn test_valid_ipv6_pools_are_canonicalised() {
        assert_eq!(validate_cidr("fd00::/122", IpVersion::V6).unwrap().to_string(), "fd00::/122");
        assert_eq!(validate_cidr("fd80::0:0/120", IpVersion::V6).unwrap().to_string(), "fd80::/120");
        assert_eq!(
            validate_cidr("::0:a:b:c:d:e:0/120", IpVersion::V6).unwrap().to_string(),
            "::a:b:c:d:e:0/120"
        );
    }

    #[test]
    fn test_host_bits_are_cleared() {
        assert_eq!(validate_cidr("10.1.2.3/24", IpVersion::V4).unwrap().to_string(), "10.1.2.0/24");
    }

    #[test]
    fn test_too_small() {
        for raw in ["172.16.0.0/27", "10.0.0.0/32", "10.0.0.1"] {
            assert!(
                matches!(validate_cidr(raw, IpVersion::V4), Err(ValidationError::TooSmall { .. })),
                "{} should be too small",
                raw
            );
        }
        for raw in ["fd00::/123", "fd00::/128", "fd00::1"] {
            assert!(
                matches!(validate_cidr(raw, IpVersion::V6), Err(ValidationError::TooSmall { .. })),
                "{} should be too small",
                raw
            );
        }
    }

    #[test]
    fn test_invalid_format() {
        for raw in ["172.16.0.0a/24", "10.0.0.0/33", "256.0.0.0/24", "1.2/16", "", "fd00::/129"] {
            assert!(
                matches!(
                    validate_cidr(raw, IpVersion::V4).or_else(|_| validate_cidr(raw, IpVersion::V6)),
                    Err(ValidationError::InvalidFormat(_))
                ),
                "{} should be unparsable",
                raw
            );
        }
    }

    #[test]
    fn test_wrong_version() {
        assert!(matches!(
            validate_cidr("fdff:ffff:ffff:ffff:ffff::/80", IpVersion::V4),
            Err(ValidationError::WrongVersion { expected: IpVersion::V4, .. })
        ));
        assert!(matches!(
            validate_cidr("172.16.0.0/24", IpVersion::V6),
            Err(ValidationError::WrongVersion { expected: IpVersion::V6, .. })
        ));
    }

    #[test]
    fn test_link_local_overlap() {
        for (raw, version) in [
            ("0.0.0.0/0", IpVersion::V4),
            ("169.254.0.0/24", IpVersion::V4),
            ("::/0", IpVersion::V6),
            ("fe80::/64", IpVersion::V6),
        ] {
            assert!(
                matches!(validate_cidr(raw, version), Err(ValidationError::OverlapsLinkLocal(_))),
                "{} should overlap link-local",
                raw
            );
        }
    }

    #[test]
    fn test_ipip_mode() {
        assert_eq!(validate_ipip_mode("off").unwrap(), IpipMode::Off);
        assert_eq!(validate_ipip_mode("always").unwrap(), IpipMode::Always);
        assert_eq!(validate_ipip_mode("cross-subnet").unwrap(), IpipMode::CrossSubnet);
        for raw in ["Off", "cross_subnet", "badVal", "reboot", ""] {
            assert!(matches!(validate_ipip_mode(raw), Err(ValidationError::UnknownMode(_))));
        }
    }
}
