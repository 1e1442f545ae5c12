//! Decoded status snapshot of the ventilation unit.

use std::fmt;

use crate::frame;
use crate::types::{AirflowDirection, FanSpeed, Mode, PowerState};

/// One decoded status frame.
///
/// A `DeviceStatus` is only ever produced by
/// [`decode_status`](crate::frame::decode_status); there are no setters.
/// A newer state means a newer frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStatus {
    powered: bool,
    mode: Mode,
    fan_speed: FanSpeed,
    manual_speed_raw: u8,
    airflow: AirflowDirection,
    raw_frame: Vec<u8>,
}

impl DeviceStatus {
    pub(crate) fn from_decoded(
        powered: bool,
        mode: Mode,
        fan_speed: FanSpeed,
        manual_speed_raw: u8,
        airflow: AirflowDirection,
        raw_frame: Vec<u8>,
    ) -> Self {
        DeviceStatus {
            powered,
            mode,
            fan_speed,
            manual_speed_raw,
            airflow,
            raw_frame,
        }
    }

    pub fn powered(&self) -> bool {
        self.powered
    }

    pub fn power_state(&self) -> PowerState {
        PowerState::from(self.powered)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn fan_speed(&self) -> FanSpeed {
        self.fan_speed
    }

    /// Continuous fan speed in percent, always within `9..=100`.
    ///
    /// Only meaningful while [`fan_speed`](Self::fan_speed) is
    /// [`FanSpeed::Manual`], but decoded from every frame.
    pub fn manual_speed_percent(&self) -> u8 {
        frame::manual_speed_percent(self.manual_speed_raw)
    }

    /// The undecoded manual speed byte.
    pub fn manual_speed_raw(&self) -> u8 {
        self.manual_speed_raw
    }

    pub fn airflow(&self) -> AirflowDirection {
        self.airflow
    }

    /// The complete reply datagram this status was decoded from.
    pub fn raw_frame(&self) -> &[u8] {
        &self.raw_frame
    }

    /// Compare the decoded fields, ignoring undecoded frame bytes.
    pub fn same_state(&self, other: &DeviceStatus) -> bool {
        self.powered == other.powered
            && self.mode == other.mode
            && self.fan_speed == other.fan_speed
            && self.manual_speed_raw == other.manual_speed_raw
            && self.airflow == other.airflow
    }

    /// Short human-readable summary, e.g. `Off` or `On - Night`.
    pub fn summary(&self) -> String {
        if self.powered {
            format!("On - {}", self.mode)
        } else {
            "Off".to_string()
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | fan {} ({}%) | {}",
            self.summary(),
            self.fan_speed,
            self.manual_speed_percent(),
            self.airflow.label()
        )
    }
}
