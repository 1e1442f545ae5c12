//! DVC 10 operation code table.
//!
//! The unit accepts nine operations. Power and day/night are *toggles*: the
//! unit flips the current value and there is no way to say "on" or "day"
//! directly. Fan presets and airflow are direct sets.
//!
//! | Operation        | Op code | Kind   |
//! |------------------|---------|--------|
//! | get status       | `010d`  | read   |
//! | toggle power     | `030d`  | toggle |
//! | fan low          | `0401`  | set    |
//! | fan medium       | `0402`  | set    |
//! | fan high         | `0403`  | set    |
//! | airflow out      | `0600`  | set    |
//! | airflow recovery | `0601`  | set    |
//! | airflow in       | `0602`  | set    |
//! | toggle day/night | `0901`  | toggle |

use std::fmt;

use ventlib_core::error::{Error, Result};
use ventlib_core::types::{AirflowDirection, FanSpeed};

use crate::protocol::encode_command;

/// One operation the unit understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    GetStatus,
    TogglePower,
    FanLow,
    FanMedium,
    FanHigh,
    AirflowOut,
    AirflowRecovery,
    AirflowIn,
    ToggleDayNight,
}

impl Command {
    /// The raw operation code appended to the identity prefix.
    pub fn op_code(self) -> &'static [u8] {
        match self {
            Command::GetStatus => &[0x01, 0x0D],
            Command::TogglePower => &[0x03, 0x0D],
            Command::FanLow => &[0x04, 0x01],
            Command::FanMedium => &[0x04, 0x02],
            Command::FanHigh => &[0x04, 0x03],
            Command::AirflowOut => &[0x06, 0x00],
            Command::AirflowRecovery => &[0x06, 0x01],
            Command::AirflowIn => &[0x06, 0x02],
            Command::ToggleDayNight => &[0x09, 0x01],
        }
    }

    /// Full request bytes for this command.
    pub fn encode(self) -> Vec<u8> {
        encode_command(self.op_code())
    }

    /// Whether sending this command can change the unit's state.
    pub fn is_write(self) -> bool {
        self != Command::GetStatus
    }

    /// The preset command for `speed`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for [`FanSpeed::Manual`], which the unit
    /// only enters on its own.
    pub fn fan_speed(speed: FanSpeed) -> Result<Command> {
        match speed {
            FanSpeed::Low => Ok(Command::FanLow),
            FanSpeed::Medium => Ok(Command::FanMedium),
            FanSpeed::High => Ok(Command::FanHigh),
            FanSpeed::Manual => Err(Error::InvalidArgument(
                "manual fan speed cannot be commanded".into(),
            )),
        }
    }

    pub fn airflow(direction: AirflowDirection) -> Command {
        match direction {
            AirflowDirection::OneWayOut => Command::AirflowOut,
            AirflowDirection::TwoWayRecovery => Command::AirflowRecovery,
            AirflowDirection::OneWayIn => Command::AirflowIn,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Command::GetStatus => "GET_STATUS",
            Command::TogglePower => "TOGGLE_POWER",
            Command::FanLow => "FAN_LOW",
            Command::FanMedium => "FAN_MEDIUM",
            Command::FanHigh => "FAN_HIGH",
            Command::AirflowOut => "AIRFLOW_OUT",
            Command::AirflowRecovery => "AIRFLOW_RECOVERY",
            Command::AirflowIn => "AIRFLOW_IN",
            Command::ToggleDayNight => "TOGGLE_DAY_NIGHT",
        };
        write!(f, "{s}")
    }
}
