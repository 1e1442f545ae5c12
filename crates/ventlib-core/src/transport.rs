//! Transport trait for unit communication.
//!
//! The [`Transport`] trait abstracts one request/reply exchange with the
//! unit. The real implementation lives in `ventlib-transport` (UDP); the
//! `ventlib-test-harness` crate provides scripted and simulated
//! implementations so the driver can be tested without hardware.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// One-datagram-in, one-datagram-out exchange with the unit.
///
/// The wire protocol has no sequence numbers or correlation IDs, so callers
/// must not run two exchanges on the same unit concurrently; the driver's
/// request gate enforces that.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and wait up to `timeout` for a single reply.
    ///
    /// Returns the reply bytes exactly as received.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`](crate::Error::Timeout) if nothing arrives in time,
    /// [`Error::Transport`](crate::Error::Transport) for any other socket
    /// fault.
    async fn exchange(&mut self, request: &[u8], timeout: Duration) -> Result<Vec<u8>>;

    /// Description of the remote end for log messages (e.g. `10.0.0.7:4000`).
    fn peer(&self) -> String;
}
