//! Per-port scan drivers (C5).
//!
//! Synchronous and single-threaded by design: each call blocks the
//! calling thread until a verdict is reached or the deadline passes.
//! The scan engine (`rawscan-engine`) is responsible for iterating
//! over ports and targets; these functions know nothing about a plan.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use rand::Rng;

use rawscan_classifier::{classify_icmp_response, classify_tcp_response};
use rawscan_common::{NetworkAddress, ScanError, ScanVerdict};
use rawscan_packet::{build_tcp_syn, build_udp_datagram};
use rawscan_socket::RawSocket;

const RECV_BUF_LEN: usize = 4096;

fn recv_loop(
    socket: &RawSocket,
    receiver: &NetworkAddress,
    deadline: Instant,
    classify: impl Fn(&[u8]) -> ScanVerdict,
) -> Result<ScanVerdict, ScanError> {
    let mut buf = [0u8; RECV_BUF_LEN];
    loop {
        match socket.recv_with_deadline(&mut buf, deadline)? {
            None => return Ok(ScanVerdict::Unknown),
            Some((n, peer)) => {
                if peer.ip() != receiver.ip_addr() {
                    continue;
                }
                match classify(&buf[..n]) {
                    ScanVerdict::Unknown => continue,
                    verdict => return Ok(verdict),
                }
            }
        }
    }
}

/// Scan one TCP port: send a SYN, classify the response, and — only if
/// the first attempt timed out with nothing conclusive — retransmit
/// once before reporting `Filtered`.
pub fn scan_tcp_port(
    socket: &RawSocket,
    sender: &NetworkAddress,
    receiver: &NetworkAddress,
    ephemeral_port: u16,
    dest_port: u16,
    timeout: Duration,
) -> Result<ScanVerdict, ScanError> {
    let family = sender.version;
    let attempt = |socket: &RawSocket| -> Result<ScanVerdict, ScanError> {
        let seq: u32 = rand::thread_rng().gen();
        let segment = build_tcp_syn(
            sender.ip_addr(),
            receiver.ip_addr(),
            ephemeral_port,
            dest_port,
            seq,
        )?;
        socket.send_to(&segment, SocketAddr::new(receiver.ip_addr(), dest_port))?;
        let deadline = Instant::now() + timeout;
        recv_loop(socket, receiver, deadline, |buf| {
            classify_tcp_response(buf, family)
        })
    };

    let first = attempt(socket)?;
    if first != ScanVerdict::Unknown {
        return Ok(first);
    }

    tracing::debug!(
        target = %receiver.ip,
        port = dest_port,
        "tcp probe inconclusive, retransmitting once"
    );
    let second = attempt(socket)?;
    Ok(match second {
        ScanVerdict::Unknown => ScanVerdict::Filtered,
        verdict => verdict,
    })
}

/// Scan one UDP port: send a datagram on `udp_socket`, then wait on a
/// separate raw ICMP socket for a destination-unreachable reply.
/// Silence within the deadline means `Open`.
pub fn scan_udp_port(
    udp_socket: &RawSocket,
    icmp_socket: &RawSocket,
    sender: &NetworkAddress,
    receiver: &NetworkAddress,
    ephemeral_port: u16,
    dest_port: u16,
    payload: &[u8],
    timeout: Duration,
) -> Result<ScanVerdict, ScanError> {
    let family = sender.version;
    let datagram = build_udp_datagram(
        sender.ip_addr(),
        receiver.ip_addr(),
        ephemeral_port,
        dest_port,
        payload,
    )?;
    udp_socket.send_to(&datagram, SocketAddr::new(receiver.ip_addr(), dest_port))?;

    let deadline = Instant::now() + timeout;
    let verdict = recv_loop(icmp_socket, receiver, deadline, |buf| {
        classify_icmp_response(buf, family)
    })?;

    Ok(match verdict {
        ScanVerdict::Unknown => ScanVerdict::Open,
        verdict => verdict,
    })
}
