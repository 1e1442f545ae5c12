//! Simulated unit served over a real loopback UDP socket.
//!
//! [`MockUdpDevice`] binds `127.0.0.1:0`, then answers each datagram using a
//! [`SimulatedDvc10`]. Point a `UdpTransport` at [`port`](MockUdpDevice::port)
//! to test the full path from driver to socket and back.
//!
//! # Example
//!
//! ```
//! use ventlib_test_harness::{MockUdpDevice, SimulatedDvc10};
//!
//! # async fn example() -> ventlib_core::Result<()> {
//! let device = MockUdpDevice::start(SimulatedDvc10::new()).await?;
//! println!("unit listening on {}", device.addr());
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

use ventlib_core::error::{Error, Result};

use crate::simulated::SimulatedDvc10;

type ReplyOverride = Arc<Mutex<Option<Vec<u8>>>>;

/// A [`SimulatedDvc10`] listening on a loopback UDP port.
///
/// The serving task is aborted when the device is dropped.
pub struct MockUdpDevice {
    addr: SocketAddr,
    device: SimulatedDvc10,
    reply_override: ReplyOverride,
    task: JoinHandle<()>,
}

impl MockUdpDevice {
    /// Bind a random loopback port and start answering requests.
    pub async fn start(device: SimulatedDvc10) -> Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0")
            .await
            .map_err(|e| Error::Transport(format!("failed to bind mock UDP device: {e}")))?;
        let addr = socket.local_addr()?;
        let reply_override: ReplyOverride = Arc::new(Mutex::new(None));

        let task = tokio::spawn(serve(socket, device.clone(), reply_override.clone()));

        tracing::debug!(addr = %addr, "mock UDP device started");

        Ok(MockUdpDevice {
            addr,
            device,
            reply_override,
            task,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Handle to the simulated state behind the socket.
    pub fn device(&self) -> &SimulatedDvc10 {
        &self.device
    }

    /// Answer every request with `reply` instead of a simulated frame.
    ///
    /// Requests are still applied to the simulated state. Pass `None` to
    /// go back to normal replies.
    pub fn override_reply(&self, reply: Option<Vec<u8>>) {
        *self.reply_override.lock().unwrap_or_else(|e| e.into_inner()) = reply;
    }
}

impl Drop for MockUdpDevice {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(socket: UdpSocket, device: SimulatedDvc10, reply_override: ReplyOverride) {
    let mut buf = vec![0u8; 512];

    loop {
        let (n, src) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                tracing::debug!(error = %e, "mock UDP device receive failed");
                continue;
            }
        };

        let reply = device.handle(&buf[..n]);
        let forced = reply_override
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        if let Some(bytes) = forced.or(reply) {
            if let Err(e) = socket.send_to(&bytes, src).await {
                tracing::debug!(error = %e, src = %src, "mock UDP device send failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use ventlib_core::frame::decode_status;
    use ventlib_core::types::FanSpeed;

    async fn roundtrip(addr: SocketAddr, request: &[u8]) -> Option<Vec<u8>> {
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(request, addr).await.unwrap();
        let mut buf = [0u8; 256];
        match tokio::time::timeout(Duration::from_millis(200), client.recv_from(&mut buf)).await {
            Ok(Ok((n, _))) => Some(buf[..n].to_vec()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn answers_status_request() {
        let device = MockUdpDevice::start(SimulatedDvc10::new().with_fan_speed(FanSpeed::Medium))
            .await
            .unwrap();

        let reply = roundtrip(device.addr(), b"mobile\x01\x0d").await.unwrap();
        let status = decode_status(&reply).unwrap();
        assert_eq!(status.fan_speed(), FanSpeed::Medium);
    }

    #[tokio::test]
    async fn silent_when_offline() {
        let device = MockUdpDevice::start(SimulatedDvc10::new()).await.unwrap();
        device.device().set_offline(true);

        assert!(roundtrip(device.addr(), b"mobile\x01\x0d").await.is_none());
        assert_eq!(device.device().requests().len(), 1);
    }

    #[tokio::test]
    async fn override_reply_is_sent_verbatim() {
        let device = MockUdpDevice::start(SimulatedDvc10::new()).await.unwrap();
        device.override_reply(Some(vec![0x6D; 10]));

        let reply = roundtrip(device.addr(), b"mobile\x01\x0d").await.unwrap();
        assert_eq!(reply, vec![0x6D; 10]);
    }
}
