//! # ventlib -- control NIBE DVC 10 ventilation units
//!
//! `ventlib` is an asynchronous library for the DVC 10 family of
//! decentralised ventilation units, which are controlled with short UDP
//! datagrams on port 4000.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ventlib::{AirflowDirection, FanSpeed};
//! use ventlib::dvc10::Dvc10Builder;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let unit = Dvc10Builder::new("192.168.1.50").connect().await?;
//!
//!     unit.turn_on().await?;
//!     unit.set_fan_speed(FanSpeed::Medium).await?;
//!     let status = unit.set_airflow(AirflowDirection::TwoWayRecovery).await?;
//!     println!("{status}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! | Crate               | Purpose                                         |
//! |---------------------|-------------------------------------------------|
//! | `ventlib-core`      | State types, status frame decoder, errors, [`Transport`] |
//! | `ventlib-transport` | UDP request/reply transport                     |
//! | `ventlib-dvc10`     | Controller, builder, and status poller          |
//! | **`ventlib`**       | This facade crate -- re-exports everything      |
//!
//! ## Events
//!
//! The controller publishes a [`VentEvent`] for every decoded status and for
//! every field that changed since the previous one. Pair it with a
//! [`StatusPoller`](dvc10::StatusPoller) to keep subscribers current:
//!
//! ```no_run
//! use std::sync::Arc;
//! use ventlib::VentEvent;
//! use ventlib::dvc10::{DEFAULT_POLL_INTERVAL, Dvc10Builder, StatusPoller};
//!
//! # async fn example() -> ventlib::Result<()> {
//! let unit = Arc::new(Dvc10Builder::new("192.168.1.50").build()?);
//! let mut events = unit.subscribe();
//! let _poller = StatusPoller::spawn(unit.clone(), DEFAULT_POLL_INTERVAL)?;
//!
//! while let Ok(event) = events.recv().await {
//!     if let VentEvent::FanSpeedChanged { speed } = event {
//!         println!("fan speed is now {speed}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub use ventlib_core::*;

/// UDP transport.
pub mod transport {
    pub use ventlib_transport::*;
}

/// DVC 10 controller.
///
/// Provides [`Dvc10`](dvc10::Dvc10), [`Dvc10Builder`](dvc10::Dvc10Builder)
/// and [`StatusPoller`](dvc10::StatusPoller).
#[cfg(feature = "dvc10")]
pub mod dvc10 {
    pub use ventlib_dvc10::*;
}
