//! RetroArch network-command client.
//!
//! Speaks the plain-text UDP protocol RetroArch exposes on its network command
//! port (55355 by default):
//!
//! ```text
//! → READ_CORE_MEMORY 7e0100 4
//! ← READ_CORE_MEMORY 7e0100 01 00 3c ff
//! ← READ_CORE_MEMORY 7e0100 -1 no memory map defined
//! ```
//!
//! A response may belong to an earlier request that timed out; those are
//! recognized by their address and skipped.

use log::{debug, info};
use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use super::MemorySource;
use crate::domain::{Address, SourceError};

const COMMAND: &str = "READ_CORE_MEMORY";

/// Largest datagram RetroArch sends back for a read
const MAX_DATAGRAM: usize = 65_536;

/// Blocking UDP client for `READ_CORE_MEMORY`
pub struct RetroArchSource {
    socket: UdpSocket,
    peer: SocketAddr,
    timeout: Duration,
}

impl RetroArchSource {
    /// Resolve `host:port` and prepare a socket with the given per-read timeout.
    ///
    /// UDP is connectionless, so this succeeds even if RetroArch is not
    /// running; the first read reports the failure.
    ///
    /// # Errors
    /// Returns an error if the host does not resolve or the socket cannot be set up.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, SourceError> {
        let peer = (host, port)
            .to_socket_addrs()
            .map_err(|e| SourceError::ConnectFailed(format!("{host}:{port}: {e}")))?
            .next()
            .ok_or_else(|| SourceError::ConnectFailed(format!("{host}:{port}: no address")))?;

        let bind_addr = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(peer)?;
        socket.set_read_timeout(Some(timeout))?;

        info!("Polling RetroArch at {peer} (timeout {}ms)", timeout.as_millis());
        Ok(Self { socket, peer, timeout })
    }
}

impl MemorySource for RetroArchSource {
    fn read(&mut self, address: Address, size: usize) -> Result<Vec<u8>, SourceError> {
        let request = format!("{COMMAND} {:x} {size}\n", address.0);
        self.socket.send(request.as_bytes()).map_err(|e| match e.kind() {
            ErrorKind::ConnectionRefused => SourceError::ConnectFailed(self.peer.to_string()),
            _ => SourceError::Io(e),
        })?;

        let started = Instant::now();
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let len = match self.socket.recv(&mut buf) {
                Ok(len) => len,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(SourceError::Timeout {
                        address,
                        waited_ms: u64::try_from(started.elapsed().as_millis())
                            .unwrap_or(u64::MAX),
                    });
                }
                Err(e) if e.kind() == ErrorKind::ConnectionRefused => {
                    return Err(SourceError::ConnectFailed(self.peer.to_string()));
                }
                Err(e) => return Err(SourceError::Io(e)),
            };

            let text = String::from_utf8_lossy(&buf[..len]);
            match parse_response(&text, address)? {
                Some(bytes) => return Ok(bytes),
                None => {
                    debug!("Skipping stale response: {}", text.trim_end());
                    if started.elapsed() >= self.timeout {
                        return Err(SourceError::Timeout {
                            address,
                            waited_ms: u64::try_from(self.timeout.as_millis())
                                .unwrap_or(u64::MAX),
                        });
                    }
                }
            }
        }
    }
}

/// Parse one `READ_CORE_MEMORY` response.
///
/// Returns `Ok(None)` when the response answers a different address.
fn parse_response(text: &str, address: Address) -> Result<Option<Vec<u8>>, SourceError> {
    let mut parts = text.split_whitespace();

    if parts.next() != Some(COMMAND) {
        return Err(SourceError::MalformedResponse(text.trim_end().to_string()));
    }

    let echoed = parts
        .next()
        .and_then(|a| u32::from_str_radix(a, 16).ok())
        .ok_or_else(|| SourceError::MalformedResponse(text.trim_end().to_string()))?;
    if echoed != address.0 {
        return Ok(None);
    }

    let rest: Vec<&str> = parts.collect();
    if rest.first() == Some(&"-1") {
        return Err(SourceError::ReadRejected { address, reason: rest[1..].join(" ") });
    }

    rest.iter()
        .map(|b| {
            u8::from_str_radix(b, 16)
                .map_err(|_| SourceError::MalformedResponse(format!("bad byte {b:?} in response")))
        })
        .collect::<Result<Vec<u8>, _>>()
        .map(Some)
}
