//! Core value types for the ventilation unit's state.
//!
//! Every enum here is closed: the `from_wire` constructors accept only the
//! byte values the unit actually reports and return `None` for anything
//! else, so an out-of-range byte is rejected at the decode boundary instead
//! of leaking into calling code as a bare integer.

use std::fmt;
use std::str::FromStr;

/// Unit power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerState {
    Off,
    On,
}

impl PowerState {
    /// Decode the power byte (0 = off, 1 = on).
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(PowerState::Off),
            1 => Some(PowerState::On),
            _ => None,
        }
    }

    /// The byte the unit uses for this state.
    pub fn wire_value(self) -> u8 {
        match self {
            PowerState::Off => 0,
            PowerState::On => 1,
        }
    }

    pub fn is_on(self) -> bool {
        self == PowerState::On
    }
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on { PowerState::On } else { PowerState::Off }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerState::Off => write!(f, "Off"),
            PowerState::On => write!(f, "On"),
        }
    }
}

impl FromStr for PowerState {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on" | "1" => Ok(PowerState::On),
            "off" | "0" => Ok(PowerState::Off),
            _ => Err(ParseEnumError::new("power state", s)),
        }
    }
}

/// Operating mode of the unit.
///
/// Day and Night alternate on each toggle command. Party is entered only by
/// the unit itself (from its own panel) and can never be commanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Day,
    Night,
    Party,
}

impl Mode {
    /// Decode the mode byte (0 = day, 1 = night, 2 = party).
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Mode::Day),
            1 => Some(Mode::Night),
            2 => Some(Mode::Party),
            _ => None,
        }
    }

    pub fn wire_value(self) -> u8 {
        match self {
            Mode::Day => 0,
            Mode::Night => 1,
            Mode::Party => 2,
        }
    }

    /// Whether this mode can be reached through a command.
    pub fn is_settable(self) -> bool {
        !matches!(self, Mode::Party)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Day => "Day",
            Mode::Night => "Night",
            Mode::Party => "Party",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Mode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(Mode::Day),
            "night" => Ok(Mode::Night),
            "party" => Ok(Mode::Party),
            _ => Err(ParseEnumError::new("mode", s)),
        }
    }
}

/// Fan speed setting.
///
/// The three presets are directly settable. `Manual` is reported when the
/// unit runs at a continuous speed (see
/// [`DeviceStatus::manual_speed_percent`](crate::DeviceStatus::manual_speed_percent))
/// and is never a valid command target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FanSpeed {
    Low,
    Medium,
    High,
    Manual,
}

impl FanSpeed {
    /// Decode the fan speed byte (1 = low, 2 = medium, 3 = high, 4 = manual).
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(FanSpeed::Low),
            2 => Some(FanSpeed::Medium),
            3 => Some(FanSpeed::High),
            4 => Some(FanSpeed::Manual),
            _ => None,
        }
    }

    pub fn wire_value(self) -> u8 {
        match self {
            FanSpeed::Low => 1,
            FanSpeed::Medium => 2,
            FanSpeed::High => 3,
            FanSpeed::Manual => 4,
        }
    }

    pub fn is_settable(self) -> bool {
        !matches!(self, FanSpeed::Manual)
    }

    /// Nominal percentage for a preset speed, `None` for `Manual`.
    ///
    /// Presets are reported to fan-style consumers as thirds of full speed.
    pub fn preset_percent(self) -> Option<u8> {
        match self {
            FanSpeed::Low => Some(33),
            FanSpeed::Medium => Some(66),
            FanSpeed::High => Some(100),
            FanSpeed::Manual => None,
        }
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FanSpeed::Low => "Low",
            FanSpeed::Medium => "Medium",
            FanSpeed::High => "High",
            FanSpeed::Manual => "Manual",
        };
        write!(f, "{s}")
    }
}

impl FromStr for FanSpeed {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" | "1" => Ok(FanSpeed::Low),
            "medium" | "med" | "2" => Ok(FanSpeed::Medium),
            "high" | "3" => Ok(FanSpeed::High),
            "manual" => Ok(FanSpeed::Manual),
            _ => Err(ParseEnumError::new("fan speed", s)),
        }
    }
}

/// Direction of air movement through the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AirflowDirection {
    /// Exhaust only.
    OneWayOut,
    /// Alternating in/out with heat recovery.
    TwoWayRecovery,
    /// Supply only.
    OneWayIn,
}

impl AirflowDirection {
    /// Decode the airflow byte (0 = out, 1 = recovery, 2 = in).
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(AirflowDirection::OneWayOut),
            1 => Some(AirflowDirection::TwoWayRecovery),
            2 => Some(AirflowDirection::OneWayIn),
            _ => None,
        }
    }

    pub fn wire_value(self) -> u8 {
        match self {
            AirflowDirection::OneWayOut => 0,
            AirflowDirection::TwoWayRecovery => 1,
            AirflowDirection::OneWayIn => 2,
        }
    }

    /// Snake-case identifier, as used for option keys.
    pub fn as_str(self) -> &'static str {
        match self {
            AirflowDirection::OneWayOut => "oneway_out",
            AirflowDirection::TwoWayRecovery => "twoway",
            AirflowDirection::OneWayIn => "oneway_in",
        }
    }

    /// Human-facing label with the direction arrows shown on the unit.
    pub fn label(self) -> &'static str {
        match self {
            AirflowDirection::OneWayOut => "One-way Out [→→]",
            AirflowDirection::TwoWayRecovery => "Two-way Recovery [←→]",
            AirflowDirection::OneWayIn => "One-way In [←←]",
        }
    }
}

impl fmt::Display for AirflowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AirflowDirection::OneWayOut => "Out",
            AirflowDirection::TwoWayRecovery => "Recovery",
            AirflowDirection::OneWayIn => "In",
        };
        write!(f, "{s}")
    }
}

impl FromStr for AirflowDirection {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "out" | "oneway_out" => Ok(AirflowDirection::OneWayOut),
            "recovery" | "twoway" => Ok(AirflowDirection::TwoWayRecovery),
            "in" | "oneway_in" => Ok(AirflowDirection::OneWayIn),
            _ => Err(ParseEnumError::new("airflow direction", s)),
        }
    }
}

/// Error returned when a string cannot be parsed into one of the state enums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    what: &'static str,
    input: String,
}

impl ParseEnumError {
    fn new(what: &'static str, input: &str) -> Self {
        ParseEnumError {
            what,
            input: input.to_string(),
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.what, self.input)
    }
}

impl std::error::Error for ParseEnumError {}
