//! Scan engine (C6).
//!
//! Drives a `ScanPlan` to completion: TCP ports before UDP ports; for
//! each port, IPv4 targets before IPv6 targets. One raw socket per
//! (protocol, family) pair is opened once and reused across every
//! port and target so setup cost is paid once, but the per-port,
//! per-family iteration order is what actually produces each
//! outcome — sockets are just an implementation detail held alongside
//! each family's context. A family with no address on the requested
//! interface is skipped silently; a missing interface is a hard error
//! surfaced by `rawscan_net::find_interface_address` before any socket
//! is opened.

use std::time::Duration;

use rand::Rng;

use rawscan_common::{IpVersion, NetworkAddress, Protocol, ScanError, ScanOutcome, ScanPlan};
use rawscan_driver::{scan_tcp_port, scan_udp_port};
use rawscan_net::find_interface_address;
use rawscan_socket::{ReceiveMode, RawSocket};

const EPHEMERAL_PORT_LOW: u16 = 49152;
const EPHEMERAL_PORT_HIGH: u16 = 65535;

fn ephemeral_port() -> u16 {
    rand::thread_rng().gen_range(EPHEMERAL_PORT_LOW..=EPHEMERAL_PORT_HIGH)
}

fn targets_for<'a>(plan: &'a ScanPlan, family: IpVersion) -> &'a [NetworkAddress] {
    match family {
        IpVersion::V4 => &plan.targets_v4,
        IpVersion::V6 => &plan.targets_v6,
    }
}

fn icmp_protocol_for(family: IpVersion) -> Protocol {
    match family {
        IpVersion::V4 => Protocol::Icmpv4,
        IpVersion::V6 => Protocol::Icmpv6,
    }
}

/// Everything needed to scan a family's targets, set up once before
/// the port loop begins.
struct TcpFamilyContext<'a> {
    sender: NetworkAddress,
    targets: &'a [NetworkAddress],
    socket: RawSocket,
}

struct UdpFamilyContext<'a> {
    sender: NetworkAddress,
    targets: &'a [NetworkAddress],
    udp_socket: RawSocket,
    icmp_socket: RawSocket,
}

fn build_tcp_contexts(plan: &ScanPlan) -> Result<Vec<TcpFamilyContext<'_>>, ScanError> {
    let mut contexts = Vec::new();
    for family in [IpVersion::V4, IpVersion::V6] {
        let sender = match find_interface_address(&plan.interface_name, family)? {
            Some(addr) => addr,
            None => continue,
        };
        let targets = targets_for(plan, family);
        if targets.is_empty() {
            continue;
        }
        let socket = RawSocket::new(family, Protocol::Tcp, ReceiveMode::PollDeadline)?;
        socket.bind_to_device(&plan.interface_name)?;
        contexts.push(TcpFamilyContext {
            sender,
            targets,
            socket,
        });
    }
    Ok(contexts)
}

fn build_udp_contexts(plan: &ScanPlan) -> Result<Vec<UdpFamilyContext<'_>>, ScanError> {
    let mut contexts = Vec::new();
    for family in [IpVersion::V4, IpVersion::V6] {
        let sender = match find_interface_address(&plan.interface_name, family)? {
            Some(addr) => addr,
            None => continue,
        };
        let targets = targets_for(plan, family);
        if targets.is_empty() {
            continue;
        }
        let udp_socket = RawSocket::new(family, Protocol::Udp, ReceiveMode::PollDeadline)?;
        udp_socket.bind_to_device(&plan.interface_name)?;
        let icmp_socket =
            RawSocket::new(family, icmp_protocol_for(family), ReceiveMode::PollDeadline)?;
        icmp_socket.bind_to_device(&plan.interface_name)?;
        contexts.push(UdpFamilyContext {
            sender,
            targets,
            udp_socket,
            icmp_socket,
        });
    }
    Ok(contexts)
}

fn run_tcp(plan: &ScanPlan, timeout: Duration) -> Result<Vec<ScanOutcome>, ScanError> {
    let mut outcomes = Vec::new();
    if plan.tcp_ports.is_empty() {
        return Ok(outcomes);
    }

    let contexts = build_tcp_contexts(plan)?;

    for &port in &plan.tcp_ports {
        for ctx in &contexts {
            for target in ctx.targets {
                let ephemeral = ephemeral_port();
                let bound_sender = ctx.sender.with_port(ephemeral as i32);
                let receiver = target.with_port(port as i32);
                let verdict = scan_tcp_port(
                    &ctx.socket,
                    &bound_sender,
                    &receiver,
                    ephemeral,
                    port,
                    timeout,
                )?;
                tracing::debug!(ip = %target.ip, port, protocol = "tcp", ?verdict, "probe complete");
                outcomes.push(ScanOutcome {
                    target_ip: target.ip.clone(),
                    port,
                    protocol: Protocol::Tcp,
                    verdict,
                });
            }
        }
    }

    Ok(outcomes)
}

fn run_udp(plan: &ScanPlan, timeout: Duration) -> Result<Vec<ScanOutcome>, ScanError> {
    let mut outcomes = Vec::new();
    if plan.udp_ports.is_empty() {
        return Ok(outcomes);
    }

    let contexts = build_udp_contexts(plan)?;

    for &port in &plan.udp_ports {
        for ctx in &contexts {
            for target in ctx.targets {
                let ephemeral = ephemeral_port();
                let bound_sender = ctx.sender.with_port(ephemeral as i32);
                let receiver = target.with_port(port as i32);
                let verdict = scan_udp_port(
                    &ctx.udp_socket,
                    &ctx.icmp_socket,
                    &bound_sender,
                    &receiver,
                    ephemeral,
                    port,
                    &[],
                    timeout,
                )?;
                tracing::debug!(ip = %target.ip, port, protocol = "udp", ?verdict, "probe complete");
                outcomes.push(ScanOutcome {
                    target_ip: target.ip.clone(),
                    port,
                    protocol: Protocol::Udp,
                    verdict,
                });
            }
        }
    }

    Ok(outcomes)
}

/// Run a complete scan plan to completion and return every outcome in
/// TCP-then-UDP, port-then-(IPv4-then-IPv6-target) order.
pub fn run_scan(plan: &ScanPlan) -> Result<Vec<ScanOutcome>, ScanError> {
    let timeout = Duration::from_millis(plan.timeout_ms);
    let mut outcomes = run_tcp(plan, timeout)?;
    outcomes.extend(run_udp(plan, timeout)?);
    Ok(outcomes)
}
