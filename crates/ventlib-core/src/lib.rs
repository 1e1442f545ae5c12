//! ventlib-core: core types, errors, and the transport trait for ventlib.
//!
//! This crate holds everything that is independent of how bytes reach the
//! ventilation unit: the closed state enums, the status frame layout and
//! decoder, the error taxonomy, and the [`Transport`] abstraction.
//!
//! # Key types
//!
//! - [`DeviceStatus`] -- one decoded status frame
//! - [`Transport`] -- one request/reply exchange with the unit
//! - [`VentEvent`] -- state change notifications
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod events;
pub mod frame;
pub mod status;
pub mod transport;
pub mod types;

pub use error::{Error, Result};
pub use events::VentEvent;
pub use frame::{MIN_FRAME_LEN, StatusFrame, decode_status};
pub use status::DeviceStatus;
pub use transport::Transport;
pub use types::*;
