//! Status frame layout and decoder.
//!
//! The unit answers every request with a fixed-layout binary frame of at
//! least [`MIN_FRAME_LEN`] bytes. The first six bytes are the ASCII identity
//! `master`; the fields we understand sit at fixed offsets after it:
//!
//! ```text
//! offset  field            values
//! ------  ---------------  -------------------------------------
//!   7     power            0 = off, 1 = on
//!   9     mode             0 = day, 1 = night, 2 = party
//!  19     fan speed        1 = low, 2 = medium, 3 = high, 4 = manual
//!  21     manual speed     0x00..=0xFF, mapped onto 9..=100 %
//!  23     airflow          0 = out, 1 = recovery, 2 = in
//! ```
//!
//! The identity prefix is not validated. Bytes beyond the known offsets are
//! kept verbatim in [`DeviceStatus::raw_frame`] and otherwise ignored.

use crate::error::{Error, Result};
use crate::status::DeviceStatus;
use crate::types::{AirflowDirection, FanSpeed, Mode, PowerState};

/// Identity prefix the unit places at the start of each reply (`master`).
pub const REPLY_PREFIX: &[u8; 6] = b"master";

/// Shortest reply that carries every known field.
pub const MIN_FRAME_LEN: usize = 36;

pub const POS_POWER: usize = 7;
pub const POS_MODE: usize = 9;
pub const POS_FAN_SPEED: usize = 19;
pub const POS_MANUAL_SPEED: usize = 21;
pub const POS_AIRFLOW: usize = 23;

/// Lowest manual speed the unit reports, at raw byte `0x00`.
pub const MANUAL_SPEED_MIN_PERCENT: u8 = 9;

/// Highest manual speed the unit reports, at raw byte `0xFF`.
pub const MANUAL_SPEED_MAX_PERCENT: u8 = 100;

/// Map the raw manual speed byte onto a percentage in `9..=100`.
///
/// The fractional part is truncated, so `0x80` gives 54 %.
pub fn manual_speed_percent(raw: u8) -> u8 {
    let span = u32::from(MANUAL_SPEED_MAX_PERCENT - MANUAL_SPEED_MIN_PERCENT);
    let scaled = u32::from(raw) * span / 255;
    MANUAL_SPEED_MIN_PERCENT + scaled as u8
}

/// Decode a reply datagram into a [`DeviceStatus`].
///
/// # Errors
///
/// Returns [`Error::MalformedFrame`] if the frame is shorter than
/// [`MIN_FRAME_LEN`] or if any enumerated field holds a value outside its
/// wire range.
pub fn decode_status(frame: &[u8]) -> Result<DeviceStatus> {
    if frame.len() < MIN_FRAME_LEN {
        return Err(Error::MalformedFrame(format!(
            "frame is {} bytes, need at least {MIN_FRAME_LEN}",
            frame.len()
        )));
    }

    let power = field(frame, POS_POWER, "power", PowerState::from_wire)?;
    let mode = field(frame, POS_MODE, "mode", Mode::from_wire)?;
    let fan_speed = field(frame, POS_FAN_SPEED, "fan speed", FanSpeed::from_wire)?;
    let airflow = field(frame, POS_AIRFLOW, "airflow", AirflowDirection::from_wire)?;
    let manual_raw = frame[POS_MANUAL_SPEED];

    Ok(DeviceStatus::from_decoded(
        power.is_on(),
        mode,
        fan_speed,
        manual_raw,
        airflow,
        frame.to_vec(),
    ))
}

fn field<T>(frame: &[u8], pos: usize, name: &str, decode: fn(u8) -> Option<T>) -> Result<T> {
    let byte = frame[pos];
    decode(byte).ok_or_else(|| {
        Error::MalformedFrame(format!("{name} byte at offset {pos} out of range: 0x{byte:02X}"))
    })
}

/// Builder for well-formed status frames.
///
/// Used by simulators and tests to produce the bytes the unit would send.
/// It does not construct a [`DeviceStatus`]; feed the bytes to
/// [`decode_status`] for that.
#[derive(Debug, Clone)]
pub struct StatusFrame {
    pub power: PowerState,
    pub mode: Mode,
    pub fan_speed: FanSpeed,
    pub manual_speed_raw: u8,
    pub airflow: AirflowDirection,
    /// Total frame length; values below [`MIN_FRAME_LEN`] are raised to it.
    pub len: usize,
}

impl Default for StatusFrame {
    fn default() -> Self {
        StatusFrame {
            power: PowerState::On,
            mode: Mode::Day,
            fan_speed: FanSpeed::Low,
            manual_speed_raw: 0,
            airflow: AirflowDirection::TwoWayRecovery,
            len: MIN_FRAME_LEN,
        }
    }
}

impl StatusFrame {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.len.max(MIN_FRAME_LEN)];
        buf[..REPLY_PREFIX.len()].copy_from_slice(REPLY_PREFIX);
        buf[POS_POWER] = self.power.wire_value();
        buf[POS_MODE] = self.mode.wire_value();
        buf[POS_FAN_SPEED] = self.fan_speed.wire_value();
        buf[POS_MANUAL_SPEED] = self.manual_speed_raw;
        buf[POS_AIRFLOW] = self.airflow.wire_value();
        buf
    }
}
