//! Unit event types.
//!
//! Events are emitted by the driver through a broadcast
//! channel whenever a fresh status is decoded, and by the status poller when
//! a scheduled refresh fails. Entity adapters subscribe to these instead of
//! polling the cached status themselves.

use crate::status::DeviceStatus;
use crate::types::{AirflowDirection, FanSpeed, Mode};

/// An event emitted when the unit's observed state changes.
#[derive(Debug, Clone)]
pub enum VentEvent {
    /// A new status frame was decoded. Sent after every successful
    /// operation, whether or not anything changed.
    StatusUpdated(DeviceStatus),

    /// Power state differs from the previously cached status.
    PowerChanged { on: bool },

    /// Operating mode differs from the previously cached status.
    ModeChanged { mode: Mode },

    /// Fan speed setting differs from the previously cached status.
    FanSpeedChanged { speed: FanSpeed },

    /// Airflow direction differs from the previously cached status.
    AirflowChanged { direction: AirflowDirection },

    /// A scheduled status refresh failed; the cached status is stale.
    UpdateFailed { reason: String },
}

impl VentEvent {
    /// Field-level change events between two consecutive statuses.
    ///
    /// With no previous status every field counts as changed.
    pub fn diff(previous: Option<&DeviceStatus>, current: &DeviceStatus) -> Vec<VentEvent> {
        let mut events = Vec::new();

        if previous.is_none_or(|p| p.powered() != current.powered()) {
            events.push(VentEvent::PowerChanged {
                on: current.powered(),
            });
        }
        if previous.is_none_or(|p| p.mode() != current.mode()) {
            events.push(VentEvent::ModeChanged {
                mode: current.mode(),
            });
        }
        if previous.is_none_or(|p| p.fan_speed() != current.fan_speed()) {
            events.push(VentEvent::FanSpeedChanged {
                speed: current.fan_speed(),
            });
        }
        if previous.is_none_or(|p| p.airflow() != current.airflow()) {
            events.push(VentEvent::AirflowChanged {
                direction: current.airflow(),
            });
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{StatusFrame, decode_status};

    fn status(frame: StatusFrame) -> DeviceStatus {
        decode_status(&frame.to_bytes()).unwrap()
    }

    #[test]
    fn diff_without_previous_reports_everything() {
        let current = status(StatusFrame::default());
        let events = VentEvent::diff(None, &current);
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn diff_identical_reports_nothing() {
        let a = status(StatusFrame::default());
        let b = status(StatusFrame::default());
        assert!(VentEvent::diff(Some(&a), &b).is_empty());
    }

    #[test]
    fn diff_reports_only_changed_fields() {
        let before = status(StatusFrame::default());
        let after = status(StatusFrame {
            fan_speed: FanSpeed::High,
            ..StatusFrame::default()
        });

        let events = VentEvent::diff(Some(&before), &after);
        assert_eq!(events.len(), 1);
        match &events[0] {
            VentEvent::FanSpeedChanged { speed } => assert_eq!(*speed, FanSpeed::High),
            other => panic!("expected FanSpeedChanged, got {other:?}"),
        }
    }
}
