//! Raw socket wrapper (C2).
//!
//! Sockets are opened with `socket2` as `SOCK_RAW` for a single L4 (or
//! ICMP) protocol and never set `IP_HDRINCL`: the kernel fills in the
//! IP header, the caller only ever builds and reads the transport
//! payload (see `rawscan-packet`).
//!
//! Receive behavior is fixed at construction time via `ReceiveMode` and
//! never changes afterwards, replacing the original two-independent-
//! flags design (non-blocking + a separately-settable timeout, which
//! could be set inconsistently) with one enum that is immutable for the
//! socket's lifetime.

use std::io;
use std::mem::MaybeUninit;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use rawscan_common::{IpVersion, Protocol, ScanError};
use socket2::{Domain, SockAddr, Socket, Type};

/// How a `RawSocket` waits for a response. Chosen once, at
/// construction, and never mutated afterwards.
#[derive(Debug, Clone, Copy)]
pub enum ReceiveMode {
    /// `SO_RCVTIMEO`-style: a single blocking recv with a kernel-
    /// enforced timeout.
    BlockingTimeout(Duration),
    /// Non-blocking socket polled in a loop; the caller supplies a
    /// deadline that is re-checked after every ignored packet, so an
    /// unrelated packet arriving late in the window can never extend
    /// the effective wait past the deadline.
    PollDeadline,
}

fn protocol_to_socket2(protocol: Protocol) -> Result<socket2::Protocol, ScanError> {
    match protocol {
        Protocol::Tcp => Ok(socket2::Protocol::TCP),
        Protocol::Udp => Ok(socket2::Protocol::UDP),
        Protocol::Icmpv4 => Ok(socket2::Protocol::ICMPV4),
        Protocol::Icmpv6 => Ok(socket2::Protocol::ICMPV6),
    }
}

/// A raw socket bound to one address family and one protocol.
pub struct RawSocket {
    inner: Socket,
    family: IpVersion,
    protocol: Protocol,
    mode: ReceiveMode,
}

impl RawSocket {
    /// Open a new raw socket. Does not set `IP_HDRINCL`: the kernel
    /// builds the IP header for every packet this socket sends.
    pub fn new(family: IpVersion, protocol: Protocol, mode: ReceiveMode) -> Result<Self, ScanError> {
        let domain = match family {
            IpVersion::V4 => Domain::IPV4,
            IpVersion::V6 => Domain::IPV6,
        };
        let proto = protocol_to_socket2(protocol)?;
        let socket = Socket::new(domain, Type::RAW, Some(proto))
            .map_err(ScanError::SocketCreateFailed)?;

        match mode {
            ReceiveMode::BlockingTimeout(timeout) => {
                socket
                    .set_read_timeout(Some(timeout))
                    .map_err(ScanError::SocketCreateFailed)?;
            }
            ReceiveMode::PollDeadline => {
                socket
                    .set_nonblocking(true)
                    .map_err(ScanError::SocketCreateFailed)?;
            }
        }

        Ok(Self {
            inner: socket,
            family,
            protocol,
            mode,
        })
    }

    pub fn family(&self) -> IpVersion {
        self.family
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Restrict this socket to a single network interface (`SO_BINDTODEVICE`).
    pub fn bind_to_device(&self, interface_name: &str) -> Result<(), ScanError> {
        self.inner
            .bind_device(Some(interface_name.as_bytes()))
            .map_err(|e| ScanError::SocketCreateFailed(e))
    }

    pub fn send_to(&self, buf: &[u8], dest: SocketAddr) -> Result<usize, ScanError> {
        // Raw IPv6 sockets reject sendto with EINVAL if the destination
        // port is non-zero; IPv4 raw sockets don't care either way.
        let dest = match (self.family, dest) {
            (IpVersion::V6, SocketAddr::V6(v6)) => {
                SocketAddr::new(std::net::IpAddr::V6(*v6.ip()), 0)
            }
            _ => dest,
        };
        let addr = SockAddr::from(dest);
        self.inner
            .send_to(buf, &addr)
            .map_err(ScanError::SendFailed)
    }

    /// Receive one datagram before `deadline`. Returns `Ok(None)` on
    /// timeout with nothing received. Only valid when this socket was
    /// constructed with `ReceiveMode::PollDeadline`; see
    /// `recv_blocking` for `ReceiveMode::BlockingTimeout`.
    pub fn recv_with_deadline(
        &self,
        buf: &mut [u8],
        deadline: Instant,
    ) -> Result<Option<(usize, SocketAddr)>, ScanError> {
        debug_assert!(matches!(self.mode, ReceiveMode::PollDeadline));

        let fd = std::os::unix::io::AsRawFd::as_raw_fd(&self.inner);
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let remaining = deadline - now;
            let timeout_ms = remaining.as_millis().min(i32::MAX as u128) as i32;

            let mut pollfd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };
            let rc = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
            if rc < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(ScanError::Io(err));
            }
            if rc == 0 {
                return Ok(None);
            }
            if pollfd.revents & libc::POLLIN == 0 {
                continue;
            }

            match self.try_recv(buf) {
                Ok(Some(result)) => return Ok(Some(result)),
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "raw socket recv failed, continuing until deadline");
                    continue;
                }
            }
        }
    }

    /// Single blocking recv, for sockets built with
    /// `ReceiveMode::BlockingTimeout`. `Ok(None)` means the kernel
    /// timeout elapsed with nothing received.
    pub fn recv_blocking(&self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, ScanError> {
        debug_assert!(matches!(self.mode, ReceiveMode::BlockingTimeout(_)));
        match self.try_recv(buf) {
            Ok(result) => Ok(result),
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                Ok(None)
            }
            Err(e) => Err(ScanError::Io(e)),
        }
    }

    fn try_recv(&self, buf: &mut [u8]) -> io::Result<Option<(usize, SocketAddr)>> {
        let uninit: &mut [MaybeUninit<u8>] = unsafe {
            std::slice::from_raw_parts_mut(buf.as_mut_ptr().cast(), buf.len())
        };
        match self.inner.recv_from(uninit) {
            Ok((n, addr)) => {
                let sock_addr = addr
                    .as_socket()
                    .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "unsupported address family"))?;
                Ok(Some((n, sock_addr)))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}
