//! Target resolution: IP literals pass through unchanged, hostnames
//! are resolved via the system resolver. Uses the synchronous
//! `Resolver` API deliberately, so the scanning core never needs an
//! async runtime.

use std::net::IpAddr;

use rawscan_common::{IpVersion, NetworkAddress, ScanError};
use trust_dns_resolver::Resolver;

/// Resolve `host` (an IP literal or a DNS name) into its IPv4 and IPv6
/// addresses, labeled with `host` as the originating name.
pub fn resolve_target(host: &str) -> Result<(Vec<NetworkAddress>, Vec<NetworkAddress>), ScanError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        let version = if ip.is_ipv4() { IpVersion::V4 } else { IpVersion::V6 };
        let addr = NetworkAddress::new(host, ip.to_string(), version, -1)?;
        return Ok(match version {
            IpVersion::V4 => (vec![addr], Vec::new()),
            IpVersion::V6 => (Vec::new(), vec![addr]),
        });
    }

    let resolver = Resolver::from_system_conf()
        .map_err(|e| ScanError::InvalidTarget(format!("resolver init failed: {e}")))?;
    let lookup = resolver
        .lookup_ip(host)
        .map_err(|e| ScanError::InvalidTarget(format!("could not resolve '{host}': {e}")))?;

    let mut v4 = Vec::new();
    let mut v6 = Vec::new();
    for ip in lookup.iter() {
        match ip {
            IpAddr::V4(_) => v4.push(NetworkAddress::new(host, ip.to_string(), IpVersion::V4, -1)?),
            IpAddr::V6(_) => v6.push(NetworkAddress::new(host, ip.to_string(), IpVersion::V6, -1)?),
        }
    }
    Ok((v4, v6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_literal_v4_skips_resolver() {
        let (v4, v6) = resolve_target("192.0.2.10").unwrap();
        assert_eq!(v4.len(), 1);
        assert!(v6.is_empty());
        assert_eq!(v4[0].ip, "192.0.2.10");
    }

    #[test]
    fn ip_literal_v6_skips_resolver() {
        let (v4, v6) = resolve_target("2001:db8::1").unwrap();
        assert!(v4.is_empty());
        assert_eq!(v6.len(), 1);
    }
}
