//! ventlib-dvc10: driver for NIBE DVC 10 ventilation units.
//!
//! The DVC 10 speaks a tiny connectionless protocol on UDP port 4000: every
//! request is answered with a complete status frame, there is no session and
//! no push. This crate turns that into a typed controller:
//!
//! - [`Dvc10`] -- status reads and idempotent setters behind a single-flight
//!   gate
//! - [`Dvc10Builder`] -- configuration (host, port, timeout)
//! - [`StatusPoller`] -- background refresh on a fixed interval
//!
//! Power and day/night mode are toggles on the wire. The setters read the
//! unit first and only send a command when the observed value differs, so
//! calling `turn_on()` twice leaves the unit on.
//!
//! # Example
//!
//! ```no_run
//! use ventlib_core::FanSpeed;
//! use ventlib_dvc10::Dvc10Builder;
//!
//! # async fn example() -> ventlib_core::Result<()> {
//! let unit = Dvc10Builder::new("192.168.1.50").build()?;
//! unit.turn_on().await?;
//! let status = unit.set_fan_speed(FanSpeed::High).await?;
//! println!("{status}");
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod commands;
pub mod controller;
pub mod poller;
pub mod protocol;
pub mod reconcile;

pub use builder::{DEFAULT_COMMAND_TIMEOUT, Dvc10Builder};
pub use commands::Command;
pub use controller::Dvc10;
pub use poller::{DEFAULT_POLL_INTERVAL, StatusPoller};
