//! Core data model (spec §3): `IpVersion`, `NetworkAddress`, `Protocol`,
//! `ScanPlan`, `Probe`, `ScanVerdict`, `ScanOutcome`.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Address family discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpVersion {
    V4,
    V6,
}

/// Transport/network-layer protocol a raw socket or probe is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmpv4,
    Icmpv6,
}

impl Protocol {
    /// Lowercase wire form used in output lines (`"tcp"` / `"udp"`).
    ///
    /// Only meaningful for `Tcp`/`Udp`; ICMP variants never appear in
    /// an outcome line.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Icmpv4 => "icmp",
            Protocol::Icmpv6 => "icmpv6",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A network address: either a local interface address (`host_label` =
/// interface name) or a resolved target address (`host_label` = the
/// DNS name it came from, possibly empty for an IP literal target).
///
/// Invariant: `ip` always parses as an address of `version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkAddress {
    pub host_label: String,
    pub ip: String,
    pub version: IpVersion,
    /// `-1` when unassigned.
    pub port: i32,
}

impl NetworkAddress {
    /// Build a `NetworkAddress`, validating that `ip` parses as an
    /// address of `version`.
    pub fn new(
        host_label: impl Into<String>,
        ip: impl Into<String>,
        version: IpVersion,
        port: i32,
    ) -> Result<Self, ScanError> {
        let ip = ip.into();
        let parsed: IpAddr = ip
            .parse()
            .map_err(|_| ScanError::InvalidTarget(format!("'{ip}' is not a valid IP address")))?;
        let matches_version = match (version, parsed) {
            (IpVersion::V4, IpAddr::V4(_)) => true,
            (IpVersion::V6, IpAddr::V6(_)) => true,
            _ => false,
        };
        if !matches_version {
            return Err(ScanError::InvalidTarget(format!(
                "'{ip}' does not match requested IP version {version:?}"
            )));
        }
        Ok(Self {
            host_label: host_label.into(),
            ip,
            version,
            port,
        })
    }

    /// Parse `ip` into a `std::net::IpAddr`. Panics only if the
    /// invariant documented on this type was violated by a caller that
    /// bypassed `new`.
    pub fn ip_addr(&self) -> IpAddr {
        self.ip
            .parse()
            .expect("NetworkAddress invariant violated: ip does not parse")
    }

    pub fn with_port(&self, port: i32) -> Self {
        Self {
            host_label: self.host_label.clone(),
            ip: self.ip.clone(),
            version: self.version,
            port,
        }
    }
}

/// A fully-resolved probe ready to be sent by a driver (C5).
#[derive(Debug, Clone)]
pub struct Probe {
    pub family: IpVersion,
    pub protocol: Protocol,
    pub sender: NetworkAddress,
    pub receiver: NetworkAddress,
    pub ephemeral_port: u16,
    pub payload: Vec<u8>,
}

/// Classification verdict for a single (protocol, port) probe.
///
/// `Incomplete` and `Unknown` are internal sentinels used while a probe
/// is still being resolved; only `Open`/`Closed`/`Filtered` are ever
/// placed into a final `ScanOutcome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanVerdict {
    Open,
    Closed,
    Filtered,
    Incomplete,
    Unknown,
}

impl ScanVerdict {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ScanVerdict::Open => "open",
            ScanVerdict::Closed => "closed",
            ScanVerdict::Filtered => "filtered",
            ScanVerdict::Incomplete => "incomplete",
            ScanVerdict::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ScanVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to the scan engine (C6), produced by the argument-parsing
/// collaborator.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    /// Empty means "list interfaces and stop"; the core is never
    /// invoked with an empty interface name (the CLI handles that
    /// case before building a `ScanPlan`).
    pub interface_name: String,
    pub timeout_ms: u64,
    pub tcp_ports: Vec<u16>,
    pub udp_ports: Vec<u16>,
    pub targets_v4: Vec<NetworkAddress>,
    pub targets_v6: Vec<NetworkAddress>,
}

impl ScanPlan {
    pub fn new(interface_name: impl Into<String>) -> Self {
        Self {
            interface_name: interface_name.into(),
            timeout_ms: 5000,
            tcp_ports: Vec::new(),
            udp_ports: Vec::new(),
            targets_v4: Vec::new(),
            targets_v6: Vec::new(),
        }
    }
}

/// One finished (target, port, protocol) result, as emitted by the
/// scan engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub target_ip: String,
    pub port: u16,
    pub protocol: Protocol,
    pub verdict: ScanVerdict,
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.target_ip, self.port, self.protocol, self.verdict
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_address_rejects_version_mismatch() {
        let err = NetworkAddress::new("eth0", "10.0.0.1", IpVersion::V6, -1);
        assert!(err.is_err());
    }

    #[test]
    fn network_address_accepts_matching_version() {
        let addr = NetworkAddress::new("eth0", "10.0.0.1", IpVersion::V4, -1).unwrap();
        assert_eq!(addr.ip_addr(), "10.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn outcome_display_matches_canonical_format() {
        let outcome = ScanOutcome {
            target_ip: "127.0.0.1".to_string(),
            port: 22,
            protocol: Protocol::Tcp,
            verdict: ScanVerdict::Open,
        };
        assert_eq!(outcome.to_string(), "127.0.0.1 22 tcp open");
    }
}
