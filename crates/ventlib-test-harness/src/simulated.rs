//! Stateful model of a DVC 10 unit.
//!
//! [`SimulatedDvc10`] answers requests the way the unit's firmware does:
//! every recognised request gets a full status frame back, reflecting the
//! state *after* the command was applied. Power and day/night are toggles;
//! fan presets and airflow are direct sets.
//!
//! Unrecognised requests (wrong identity prefix, unknown op code) get no
//! reply at all, which the caller observes as a timeout.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use ventlib_core::error::{Error, Result};
use ventlib_core::frame::{MIN_FRAME_LEN, StatusFrame};
use ventlib_core::transport::Transport;
use ventlib_core::types::{AirflowDirection, FanSpeed, Mode, PowerState};

/// Identity prefix the unit expects on every request.
const REQUEST_PREFIX: &[u8] = b"mobile";

#[derive(Debug)]
struct SimState {
    frame: StatusFrame,
    offline: bool,
    requests: Vec<Vec<u8>>,
}

/// A simulated unit; clones share state.
#[derive(Debug, Clone)]
pub struct SimulatedDvc10 {
    state: Arc<Mutex<SimState>>,
}

impl Default for SimulatedDvc10 {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDvc10 {
    /// A powered unit in Day mode, Low fan, two-way recovery.
    pub fn new() -> Self {
        SimulatedDvc10 {
            state: Arc::new(Mutex::new(SimState {
                frame: StatusFrame::default(),
                offline: false,
                requests: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_power(self, on: bool) -> Self {
        self.lock().frame.power = PowerState::from(on);
        self
    }

    pub fn with_mode(self, mode: Mode) -> Self {
        self.lock().frame.mode = mode;
        self
    }

    pub fn with_fan_speed(self, speed: FanSpeed) -> Self {
        self.lock().frame.fan_speed = speed;
        self
    }

    pub fn with_manual_speed_raw(self, raw: u8) -> Self {
        self.lock().frame.manual_speed_raw = raw;
        self
    }

    pub fn with_airflow(self, direction: AirflowDirection) -> Self {
        self.lock().frame.airflow = direction;
        self
    }

    /// Pad replies to `len` bytes (never below the minimum frame length).
    pub fn with_frame_len(self, len: usize) -> Self {
        self.lock().frame.len = len.max(MIN_FRAME_LEN);
        self
    }

    /// While offline the unit drops every request without replying.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Change the mode behind the client's back, as the unit's own panel
    /// would (this is the only way into Party mode).
    pub fn set_mode_locally(&self, mode: Mode) {
        self.lock().frame.mode = mode;
    }

    pub fn power(&self) -> PowerState {
        self.lock().frame.power
    }

    pub fn mode(&self) -> Mode {
        self.lock().frame.mode
    }

    pub fn fan_speed(&self) -> FanSpeed {
        self.lock().frame.fan_speed
    }

    pub fn airflow(&self) -> AirflowDirection {
        self.lock().frame.airflow
    }

    /// Every request received, including ones that were not answered.
    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.lock().requests.clone()
    }

    /// How many received requests carried the op code `op`.
    pub fn count_of(&self, op: &[u8]) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.strip_prefix(REQUEST_PREFIX) == Some(op))
            .count()
    }

    /// Requests other than status reads.
    pub fn write_count(&self) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.strip_prefix(REQUEST_PREFIX) != Some(&[0x01, 0x0D][..]))
            .count()
    }

    /// Apply one request and produce the reply frame, or `None` to stay
    /// silent.
    pub fn handle(&self, request: &[u8]) -> Option<Vec<u8>> {
        let mut state = self.lock();
        state.requests.push(request.to_vec());

        if state.offline {
            return None;
        }

        let op = request.strip_prefix(REQUEST_PREFIX)?;
        let frame = &mut state.frame;

        match op {
            [0x01, 0x0D] => {}
            [0x03, 0x0D] => {
                frame.power = match frame.power {
                    PowerState::On => PowerState::Off,
                    PowerState::Off => PowerState::On,
                };
            }
            [0x04, n] => frame.fan_speed = FanSpeed::from_wire(*n).filter(|s| s.is_settable())?,
            [0x06, n] => frame.airflow = AirflowDirection::from_wire(*n)?,
            [0x09, 0x01] => {
                // Toggling out of Party lands on Day in this model.
                frame.mode = match frame.mode {
                    Mode::Day => Mode::Night,
                    Mode::Night | Mode::Party => Mode::Day,
                };
            }
            _ => {
                tracing::debug!(op = ?op, "simulated unit ignoring unknown op code");
                return None;
            }
        }

        Some(frame.to_bytes())
    }
}

#[async_trait]
impl Transport for SimulatedDvc10 {
    async fn exchange(&mut self, request: &[u8], _timeout: Duration) -> Result<Vec<u8>> {
        self.handle(request).ok_or(Error::Timeout)
    }

    fn peer(&self) -> String {
        "simulated-dvc10".to_string()
    }
}
