//! Network interface enumeration and validation.
//!
//! Mirrors the distinction the original scanner draws between two
//! failure modes: an interface name that doesn't exist at all is a
//! hard error, while an interface that exists but has no address of
//! the requested family is silently skipped by the caller.

use pnet_datalink::interfaces;
use rawscan_common::{IpVersion, NetworkAddress, ScanError};

/// One interface and the addresses configured on it, for `--list-interfaces`.
#[derive(Debug, Clone)]
pub struct InterfaceSummary {
    pub name: String,
    pub addresses: Vec<NetworkAddress>,
}

fn addresses_for(name: &str) -> Vec<NetworkAddress> {
    interfaces()
        .into_iter()
        .find(|iface| iface.name == name)
        .map(|iface| {
            iface
                .ips
                .into_iter()
                .filter_map(|net| {
                    let ip = net.ip();
                    let version = if ip.is_ipv4() {
                        IpVersion::V4
                    } else {
                        IpVersion::V6
                    };
                    NetworkAddress::new(name, ip.to_string(), version, -1).ok()
                })
                .collect()
        })
        .unwrap_or_default()
}

/// List every interface on the host along with its addresses, deduped
/// by name (interfaces can appear multiple times in raw enumeration,
/// once per address family).
pub fn list_interfaces() -> Vec<InterfaceSummary> {
    let mut seen = std::collections::BTreeSet::new();
    let mut summaries = Vec::new();
    for iface in interfaces() {
        if !seen.insert(iface.name.clone()) {
            continue;
        }
        summaries.push(InterfaceSummary {
            addresses: addresses_for(&iface.name),
            name: iface.name,
        });
    }
    summaries
}

/// Resolve `name` to its address of `version`.
///
/// Returns `Err(NoInterface)` if no interface named `name` exists at
/// all. Returns `Ok(None)` if the interface exists but carries no
/// address of the requested family — the caller is expected to skip
/// that (interface, family) combination silently rather than error.
pub fn find_interface_address(
    name: &str,
    version: IpVersion,
) -> Result<Option<NetworkAddress>, ScanError> {
    let exists = interfaces().into_iter().any(|iface| iface.name == name);
    if !exists {
        return Err(ScanError::NoInterface(name.to_string()));
    }
    Ok(addresses_for(name)
        .into_iter()
        .find(|addr| addr.version == version))
}
