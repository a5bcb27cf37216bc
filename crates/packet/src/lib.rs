//! TCP SYN and UDP transport segment builder (C3).
//!
//! Only the transport-layer header (and, for UDP, payload) is built
//! here; the IP header is left to the kernel since the raw sockets
//! this crate feeds never set `IP_HDRINCL`. Checksums are computed
//! over `pseudo_header || transport_segment` per RFC 793 / RFC 768.

use std::net::IpAddr;

use rawscan_common::{internet_checksum, ScanError};

const IPPROTO_TCP: u8 = 6;
const IPPROTO_UDP: u8 = 17;

const TCP_FLAG_SYN: u8 = 0x02;

fn pseudo_header_v4(src: std::net::Ipv4Addr, dst: std::net::Ipv4Addr, protocol: u8, length: u16) -> Vec<u8> {
    let mut buf = Vec::with_capacity(12);
    buf.extend_from_slice(&src.octets());
    buf.extend_from_slice(&dst.octets());
    buf.push(0);
    buf.push(protocol);
    buf.extend_from_slice(&length.to_be_bytes());
    buf
}

fn pseudo_header_v6(src: std::net::Ipv6Addr, dst: std::net::Ipv6Addr, protocol: u8, length: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(40);
    buf.extend_from_slice(&src.octets());
    buf.extend_from_slice(&dst.octets());
    buf.extend_from_slice(&length.to_be_bytes());
    buf.extend_from_slice(&[0, 0, 0]);
    buf.push(protocol);
    buf
}

fn pseudo_header(src: IpAddr, dst: IpAddr, protocol: u8, length: u32) -> Result<Vec<u8>, ScanError> {
    match (src, dst) {
        (IpAddr::V4(s), IpAddr::V4(d)) => Ok(pseudo_header_v4(s, d, protocol, length as u16)),
        (IpAddr::V6(s), IpAddr::V6(d)) => Ok(pseudo_header_v6(s, d, protocol, length)),
        _ => Err(ScanError::InvalidTarget(
            "source and destination address families must match".to_string(),
        )),
    }
}

/// Build a 20-byte TCP segment with only the SYN flag set and no
/// options, with a correct checksum for the given source/destination
/// pair.
pub fn build_tcp_syn(
    src: IpAddr,
    dst: IpAddr,
    src_port: u16,
    dst_port: u16,
    seq: u32,
) -> Result<Vec<u8>, ScanError> {
    let mut header = vec![0u8; 20];
    header[0..2].copy_from_slice(&src_port.to_be_bytes());
    header[2..4].copy_from_slice(&dst_port.to_be_bytes());
    header[4..8].copy_from_slice(&seq.to_be_bytes());
    header[8..12].copy_from_slice(&0u32.to_be_bytes()); // ack
    header[12] = 5 << 4; // data offset: 5 words, no options
    header[13] = TCP_FLAG_SYN;
    header[14..16].copy_from_slice(&5840u16.to_be_bytes()); // window
    header[16..18].copy_from_slice(&0u16.to_be_bytes()); // checksum placeholder
    header[18..20].copy_from_slice(&0u16.to_be_bytes()); // urgent pointer

    let pseudo = pseudo_header(src, dst, IPPROTO_TCP, header.len() as u32)?;
    let mut checksum_input = pseudo;
    checksum_input.extend_from_slice(&header);
    let checksum = internet_checksum(&checksum_input);
    header[16..18].copy_from_slice(&checksum.to_be_bytes());

    Ok(header)
}

/// Build a UDP datagram (8-byte header + `payload`) with a correct
/// checksum for the given source/destination pair.
pub fn build_udp_datagram(
    src: IpAddr,
    dst: IpAddr,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Result<Vec<u8>, ScanError> {
    let total_len = 8 + payload.len();
    let mut datagram = vec![0u8; total_len];
    datagram[0..2].copy_from_slice(&src_port.to_be_bytes());
    datagram[2..4].copy_from_slice(&dst_port.to_be_bytes());
    datagram[4..6].copy_from_slice(&(total_len as u16).to_be_bytes());
    datagram[6..8].copy_from_slice(&0u16.to_be_bytes()); // checksum placeholder
    datagram[8..].copy_from_slice(payload);

    let pseudo = pseudo_header(src, dst, IPPROTO_UDP, total_len as u32)?;
    let mut checksum_input = pseudo;
    checksum_input.extend_from_slice(&datagram);
    let mut checksum = internet_checksum(&checksum_input);
    if checksum == 0 {
        // RFC 768: a computed checksum of zero is transmitted as all ones.
        checksum = 0xFFFF;
    }
    datagram[6..8].copy_from_slice(&checksum.to_be_bytes());

    Ok(datagram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::net::Ipv6Addr;

    #[test]
    fn tcp_syn_sets_only_syn_flag() {
        let seg = build_tcp_syn(
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
            49152,
            80,
            0x1234_5678,
        )
        .unwrap();
        assert_eq!(seg.len(), 20);
        assert_eq!(seg[13], TCP_FLAG_SYN);
    }

    #[test]
    fn tcp_syn_rejects_mismatched_families() {
        let err = build_tcp_syn(
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            1234,
            80,
            0,
        );
        assert!(err.is_err());
    }

    #[test]
    fn udp_datagram_checksum_is_internally_consistent() {
        let dgram = build_udp_datagram(
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)),
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)),
            49200,
            53,
            b"probe",
        )
        .unwrap();
        assert_eq!(dgram.len(), 13);
        let pseudo = pseudo_header_v4(
            Ipv4Addr::new(192, 168, 1, 10),
            Ipv4Addr::new(192, 168, 1, 20),
            IPPROTO_UDP,
            dgram.len() as u16,
        );
        let mut buf = pseudo;
        buf.extend_from_slice(&dgram);
        assert_eq!(internet_checksum(&buf), 0);
    }

    #[test]
    fn tcp_syn_over_ipv6_produces_correct_length() {
        let seg = build_tcp_syn(
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1)),
            49152,
            443,
            1,
        )
        .unwrap();
        assert_eq!(seg.len(), 20);
    }
}
