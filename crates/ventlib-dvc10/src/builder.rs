//! Dvc10Builder -- fluent builder for constructing [`Dvc10`] instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use ventlib_dvc10::Dvc10Builder;
//!
//! # async fn example() -> ventlib_core::Result<()> {
//! let unit = Dvc10Builder::new("192.168.1.50")
//!     .command_timeout(Duration::from_secs(3))
//!     .connect()
//!     .await?;
//! println!("{}", unit.get_status().await?);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use tracing::debug;

use ventlib_core::error::{Error, Result};
use ventlib_core::transport::Transport;
use ventlib_transport::{DEFAULT_PORT, UdpTransport};

use crate::controller::Dvc10;

/// Default wait for a reply to a single request.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Fluent builder for [`Dvc10`].
#[derive(Debug, Clone)]
pub struct Dvc10Builder {
    host: String,
    port: u16,
    command_timeout: Duration,
}

impl Dvc10Builder {
    /// Create a builder for the unit at `host` (name or IP address).
    pub fn new(host: &str) -> Self {
        Dvc10Builder {
            host: host.trim().to_string(),
            port: DEFAULT_PORT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Override the UDP port (default: 4000).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set how long to wait for each reply (default: 2s).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(Error::InvalidArgument("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(Error::InvalidArgument("port must not be 0".into()));
        }
        if self.command_timeout.is_zero() {
            return Err(Error::InvalidArgument(
                "command timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Build a controller talking UDP to the configured host.
    ///
    /// No traffic is sent; use [`connect`](Self::connect) to also verify the
    /// unit answers.
    pub fn build(self) -> Result<Dvc10> {
        self.validate()?;
        let transport = UdpTransport::new(&self.host, self.port);
        self.build_with_transport(Box::new(transport))
    }

    /// Build a controller over a caller-supplied transport.
    ///
    /// The host and port are ignored; the command timeout still applies.
    pub fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<Dvc10> {
        if self.command_timeout.is_zero() {
            return Err(Error::InvalidArgument(
                "command timeout must be greater than zero".into(),
            ));
        }
        debug!(
            peer = %transport.peer(),
            timeout_ms = self.command_timeout.as_millis() as u64,
            "building DVC 10 controller"
        );
        Ok(Dvc10::new(transport, self.command_timeout))
    }

    /// Build over UDP and read the status once to confirm the unit is
    /// reachable.
    pub async fn connect(self) -> Result<Dvc10> {
        let unit = self.build()?;
        unit.get_status().await?;
        Ok(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ventlib_test_harness::{MockUdpDevice, SimulatedDvc10};

    #[test]
    fn defaults() {
        let builder = Dvc10Builder::new("10.0.0.5");
        assert_eq!(builder.port, 4000);
        assert_eq!(builder.command_timeout, Duration::from_secs(2));
    }

    #[test]
    fn empty_host_rejected() {
        let result = Dvc10Builder::new("  ").build();
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn zero_port_rejected() {
        let result = Dvc10Builder::new("10.0.0.5").port(0).build();
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn zero_timeout_rejected() {
        let result = Dvc10Builder::new("10.0.0.5")
            .command_timeout(Duration::ZERO)
            .build_with_transport(Box::new(SimulatedDvc10::new()));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn build_sends_nothing() {
        let unit = Dvc10Builder::new("10.0.0.5").port(4001).build().unwrap();
        assert_eq!(unit.peer(), "10.0.0.5:4001");
        assert!(unit.last_status().is_none());
    }

    #[tokio::test]
    async fn connect_reads_status_once() {
        let device = MockUdpDevice::start(SimulatedDvc10::new()).await.unwrap();
        let unit = Dvc10Builder::new("127.0.0.1")
            .port(device.port())
            .connect()
            .await
            .unwrap();
        assert!(unit.last_status().is_some());
        assert_eq!(device.device().requests().len(), 1);
    }

    #[tokio::test]
    async fn connect_to_silent_unit_times_out() {
        let sim = SimulatedDvc10::new();
        sim.set_offline(true);
        let device = MockUdpDevice::start(sim).await.unwrap();
        let result = Dvc10Builder::new("127.0.0.1")
            .port(device.port())
            .command_timeout(Duration::from_millis(50))
            .connect()
            .await;
        assert!(matches!(result, Err(Error::Timeout)));
    }
}
