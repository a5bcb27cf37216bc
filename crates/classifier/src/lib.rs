//! Response classifier (C4).
//!
//! A Linux `SOCK_RAW` IPv4 socket delivers the IP header along with the
//! payload; the equivalent IPv6 socket does not (the kernel strips it
//! before the next-header payload reaches userspace). Every parser
//! here takes the address family explicitly so it knows whether to
//! skip a variable-length IPv4 header first.

use rawscan_common::{IpVersion, ScanVerdict};

const TCP_FLAG_SYN: u8 = 0x02;
const TCP_FLAG_RST: u8 = 0x04;
const TCP_FLAG_ACK: u8 = 0x10;

const ICMPV4_DEST_UNREACHABLE: u8 = 3;
const ICMPV6_DEST_UNREACHABLE: u8 = 1;

/// The subset of a TCP header's flag byte this scanner cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpFlags {
    pub syn: bool,
    pub ack: bool,
    pub rst: bool,
}

fn ipv4_header_len(buf: &[u8]) -> Option<usize> {
    let first = *buf.first()?;
    let ihl = (first & 0x0F) as usize;
    let len = ihl * 4;
    if len < 20 || len > buf.len() {
        return None;
    }
    Some(len)
}

/// Locate the TCP header within a raw socket read, skipping the IPv4
/// header when present, and extract its flags.
pub fn parse_tcp_flags(buf: &[u8], family: IpVersion) -> Option<TcpFlags> {
    let tcp_start = match family {
        IpVersion::V4 => ipv4_header_len(buf)?,
        IpVersion::V6 => 0,
    };
    let tcp = buf.get(tcp_start..)?;
    let flags_byte = *tcp.get(13)?;
    Some(TcpFlags {
        syn: flags_byte & TCP_FLAG_SYN != 0,
        ack: flags_byte & TCP_FLAG_ACK != 0,
        rst: flags_byte & TCP_FLAG_RST != 0,
    })
}

/// Classify a TCP response packet. Returns `ScanVerdict::Unknown` when
/// the packet doesn't match a RST or SYN-or-ACK pattern, leaving the
/// driver to keep waiting within its deadline.
pub fn classify_tcp_response(buf: &[u8], family: IpVersion) -> ScanVerdict {
    match parse_tcp_flags(buf, family) {
        Some(flags) if flags.rst => ScanVerdict::Closed,
        Some(flags) if flags.syn || flags.ack => ScanVerdict::Open,
        _ => ScanVerdict::Unknown,
    }
}

/// Classify an ICMP (v4) or ICMPv6 response to a UDP probe. Only
/// destination-unreachable maps to `Closed`; everything else is
/// `Unknown` so the driver keeps waiting.
pub fn classify_icmp_response(buf: &[u8], family: IpVersion) -> ScanVerdict {
    let icmp_start = match family {
        IpVersion::V4 => match ipv4_header_len(buf) {
            Some(len) => len,
            None => return ScanVerdict::Unknown,
        },
        IpVersion::V6 => 0,
    };
    let Some(icmp_type) = buf.get(icmp_start).copied() else {
        return ScanVerdict::Unknown;
    };
    let unreachable_type = match family {
        IpVersion::V4 => ICMPV4_DEST_UNREACHABLE,
        IpVersion::V6 => ICMPV6_DEST_UNREACHABLE,
    };
    if icmp_type == unreachable_type {
        ScanVerdict::Closed
    } else {
        ScanVerdict::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tcp_header_with_flags(flags: u8) -> Vec<u8> {
        let mut header = vec![0u8; 20];
        header[13] = flags;
        header
    }

    #[test]
    fn ipv6_rst_is_closed() {
        let header = tcp_header_with_flags(TCP_FLAG_RST);
        assert_eq!(classify_tcp_response(&header, IpVersion::V6), ScanVerdict::Closed);
    }

    #[test]
    fn ipv6_syn_ack_is_open() {
        let header = tcp_header_with_flags(TCP_FLAG_SYN | TCP_FLAG_ACK);
        assert_eq!(classify_tcp_response(&header, IpVersion::V6), ScanVerdict::Open);
    }

    #[test]
    fn ipv6_ack_only_is_open() {
        let header = tcp_header_with_flags(TCP_FLAG_ACK);
        assert_eq!(classify_tcp_response(&header, IpVersion::V6), ScanVerdict::Open);
    }

    #[test]
    fn ipv6_syn_only_is_open() {
        let header = tcp_header_with_flags(TCP_FLAG_SYN);
        assert_eq!(classify_tcp_response(&header, IpVersion::V6), ScanVerdict::Open);
    }

    #[test]
    fn ipv4_skips_ip_header_before_reading_flags() {
        let mut packet = vec![0x45u8, 0, 0, 28, 0, 0, 0, 0, 64, 6, 0, 0, 10, 0, 0, 1, 10, 0, 0, 2];
        packet.extend(tcp_header_with_flags(TCP_FLAG_RST));
        assert_eq!(classify_tcp_response(&packet, IpVersion::V4), ScanVerdict::Closed);
    }

    #[test]
    fn unrelated_flags_are_unknown() {
        let header = tcp_header_with_flags(0);
        assert_eq!(classify_tcp_response(&header, IpVersion::V6), ScanVerdict::Unknown);
    }

    #[test]
    fn icmpv4_dest_unreachable_is_closed() {
        let mut packet = vec![0x45u8, 0, 0, 28, 0, 0, 0, 0, 64, 1, 0, 0, 10, 0, 0, 1, 10, 0, 0, 2];
        packet.extend_from_slice(&[3, 3, 0, 0]);
        assert_eq!(classify_icmp_response(&packet, IpVersion::V4), ScanVerdict::Closed);
    }

    #[test]
    fn icmpv6_non_unreachable_is_unknown() {
        let packet = [128u8, 0, 0, 0];
        assert_eq!(classify_icmp_response(&packet, IpVersion::V6), ScanVerdict::Unknown);
    }
}
