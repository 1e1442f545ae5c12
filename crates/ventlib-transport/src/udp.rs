//! UDP transport for unit communication.
//!
//! The unit listens on a single UDP port and answers each request datagram
//! with exactly one reply datagram. [`UdpTransport`] keeps no socket between
//! exchanges: every call to [`exchange`](Transport::exchange) resolves the
//! host, binds a fresh ephemeral socket, sends, waits for one reply, and
//! drops the socket. There is no connection to lose and nothing to
//! reconnect.
//!
//! The socket is `connect()`ed to the unit, so only replies from the unit's
//! address are accepted and an ICMP port-unreachable comes back as
//! [`Error::Transport`] instead of waiting out the deadline. The deadline
//! covers the whole exchange, name resolution included.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;

use ventlib_core::error::{Error, Result};
use ventlib_core::transport::Transport;

/// Port the unit listens on unless reconfigured.
pub const DEFAULT_PORT: u16 = 4000;

/// Receive buffer size. Status frames are a few dozen bytes.
pub const RX_BUFFER_SIZE: usize = 4096;

/// Per-exchange UDP transport to one unit.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    host: String,
    port: u16,
}

impl UdpTransport {
    /// Create a transport for the unit at `host:port`.
    ///
    /// No I/O happens here; the host is resolved on each exchange.
    pub fn new(host: &str, port: u16) -> Self {
        UdpTransport {
            host: host.to_string(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn resolve(&self) -> Result<SocketAddr> {
        let mut addrs = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| {
                tracing::error!(host = %self.host, error = %e, "Failed to resolve unit address");
                Error::Transport(format!("failed to resolve {}: {e}", self.host))
            })?;

        addrs
            .next()
            .ok_or_else(|| Error::Transport(format!("no address found for {}", self.host)))
    }

    async fn bind_for(remote: SocketAddr) -> Result<UdpSocket> {
        let local: SocketAddr = match remote {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        UdpSocket::bind(local).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to bind UDP socket");
            Error::Transport(format!("failed to bind UDP socket: {e}"))
        })
    }

    /// Resolve, bind, connect, send, and wait for one reply. Not bounded by
    /// a deadline on its own.
    async fn round_trip(&self, request: &[u8]) -> Result<Vec<u8>> {
        let remote = self.resolve().await?;
        let socket = Self::bind_for(remote).await?;

        socket.connect(remote).await.map_err(|e| {
            tracing::error!(remote = %remote, error = %e, "Failed to connect UDP socket");
            Error::Transport(format!("failed to connect UDP socket to {remote}: {e}"))
        })?;

        tracing::trace!(remote = %remote, bytes = request.len(), "Sending datagram");
        socket.send(request).await.map_err(|e| {
            tracing::error!(remote = %remote, error = %e, "Failed to send datagram");
            Error::from(e)
        })?;

        let mut buf = vec![0u8; RX_BUFFER_SIZE];
        let n = socket.recv(&mut buf).await.map_err(|e| {
            tracing::error!(remote = %remote, error = %e, "Failed to receive datagram");
            Error::from(e)
        })?;
        tracing::trace!(remote = %remote, bytes = n, "Received datagram");

        buf.truncate(n);
        Ok(buf)
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn exchange(&mut self, request: &[u8], timeout: Duration) -> Result<Vec<u8>> {
        match tokio::time::timeout(timeout, self.round_trip(request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(
                    peer = %self.peer(),
                    timeout_ms = timeout.as_millis() as u64,
                    "Timeout waiting for datagram"
                );
                Err(Error::Timeout)
            }
        }
    }

    fn peer(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
