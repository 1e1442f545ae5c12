//! ventlib-test-harness: mock transports and a simulated unit for ventlib.
//!
//! - [`MockTransport`] replays scripted request/reply pairs and records
//!   everything sent, for byte-exact driver tests.
//! - [`SimulatedDvc10`] models the unit's state machine (power and
//!   day/night toggles, preset fan speeds, airflow) and answers with real
//!   status frames.
//! - [`MockUdpDevice`] serves a [`SimulatedDvc10`] on a loopback UDP
//!   socket so the real UDP transport can be exercised end to end.

pub mod mock_transport;
pub mod mock_udp;
pub mod simulated;

pub use mock_transport::MockTransport;
pub use mock_udp::MockUdpDevice;
pub use simulated::SimulatedDvc10;
