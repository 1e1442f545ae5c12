//! Transport implementations for ventlib.
//!
//! - [`UdpTransport`]: one UDP socket per request/reply exchange, the way
//!   the unit's mobile app talks to it.
//!
//! # Example
//!
//! ```no_run
//! use ventlib_core::transport::Transport;
//! use ventlib_transport::UdpTransport;
//! use std::time::Duration;
//!
//! # async fn example() -> ventlib_core::Result<()> {
//! let mut transport = UdpTransport::new("192.168.1.40", 4000);
//! let reply = transport
//!     .exchange(b"mobile\x01\x0d", Duration::from_secs(2))
//!     .await?;
//! println!("{} bytes", reply.len());
//! # Ok(())
//! # }
//! ```

pub mod udp;

pub use udp::{DEFAULT_PORT, RX_BUFFER_SIZE, UdpTransport};
