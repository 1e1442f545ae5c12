//! Dvc10 -- the high-level controller for one DVC 10 unit.
//!
//! All traffic to the unit goes through a single gate: one exchange in
//! flight at a time, and a read-then-write sequence holds the gate for both
//! exchanges so no other caller can slip a request in between the read that
//! decided on a toggle and the toggle itself.
//!
//! Every successful exchange refreshes the cached status and publishes
//! [`VentEvent`]s. A failed exchange leaves the cache as it was.

use std::time::Duration;

use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, trace};

use ventlib_core::error::Result;
use ventlib_core::events::VentEvent;
use ventlib_core::status::DeviceStatus;
use ventlib_core::transport::Transport;
use ventlib_core::types::{AirflowDirection, FanSpeed, Mode, PowerState};

use crate::commands::Command;
use crate::protocol;
use crate::reconcile::{Reconcile, reconcile};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A DVC 10 ventilation unit controlled over its UDP protocol.
///
/// Constructed via [`Dvc10Builder`](crate::builder::Dvc10Builder). Share it
/// across tasks behind an `Arc`; every method takes `&self`.
pub struct Dvc10 {
    gate: Mutex<Box<dyn Transport>>,
    command_timeout: Duration,
    peer: String,
    status_tx: watch::Sender<Option<DeviceStatus>>,
    event_tx: broadcast::Sender<VentEvent>,
}

impl Dvc10 {
    pub(crate) fn new(transport: Box<dyn Transport>, command_timeout: Duration) -> Self {
        let peer = transport.peer();
        let (status_tx, _) = watch::channel(None);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Dvc10 {
            gate: Mutex::new(transport),
            command_timeout,
            peer,
            status_tx,
            event_tx,
        }
    }

    /// Address of the unit, as reported by the transport.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// The status decoded by the most recent successful exchange, if any.
    pub fn last_status(&self) -> Option<DeviceStatus> {
        self.status_tx.borrow().clone()
    }

    /// Subscribe to state change events.
    pub fn subscribe(&self) -> broadcast::Receiver<VentEvent> {
        self.event_tx.subscribe()
    }

    /// Read the unit's current status.
    pub async fn get_status(&self) -> Result<DeviceStatus> {
        let mut transport = self.gate.lock().await;
        self.exchange(transport.as_mut(), Command::GetStatus).await
    }

    /// Make sure the unit is powered on. Sends nothing if it already is.
    pub async fn turn_on(&self) -> Result<DeviceStatus> {
        self.apply(PowerState::On).await
    }

    /// Make sure the unit is powered off. Sends nothing if it already is.
    pub async fn turn_off(&self) -> Result<DeviceStatus> {
        self.apply(PowerState::Off).await
    }

    pub async fn set_power(&self, on: bool) -> Result<DeviceStatus> {
        self.apply(PowerState::from(on)).await
    }

    /// Select a fan speed preset.
    ///
    /// [`FanSpeed::Manual`] is rejected with
    /// [`Error::InvalidArgument`](ventlib_core::Error::InvalidArgument)
    /// before anything is sent.
    pub async fn set_fan_speed(&self, speed: FanSpeed) -> Result<DeviceStatus> {
        self.apply(speed).await
    }

    /// Switch between day and night mode.
    ///
    /// The unit only offers a day/night toggle, so the current mode is read
    /// first and the toggle is sent only when it differs. From party mode a
    /// single toggle is sent and the returned status shows where the unit
    /// actually ended up, which may not be `mode`. Requesting
    /// [`Mode::Party`] is rejected before anything is sent.
    pub async fn set_mode(&self, mode: Mode) -> Result<DeviceStatus> {
        self.apply(mode).await
    }

    pub async fn set_airflow(&self, direction: AirflowDirection) -> Result<DeviceStatus> {
        self.apply(direction).await
    }

    /// Publish an [`VentEvent::UpdateFailed`] to subscribers.
    pub(crate) fn publish_update_failure(&self, reason: String) {
        let _ = self.event_tx.send(VentEvent::UpdateFailed { reason });
    }

    /// Read the unit, then send at most one command to move `desired` into
    /// place. Returns the status from the last successful exchange.
    async fn apply<T: Reconcile>(&self, desired: T) -> Result<DeviceStatus> {
        // Unsettable values fail before the gate is taken.
        desired.command()?;

        let mut transport = self.gate.lock().await;
        let current = self.exchange(transport.as_mut(), Command::GetStatus).await?;

        match reconcile(desired, &current)? {
            None => {
                debug!(field = T::FIELD, value = %desired, "unit already in requested state");
                Ok(current)
            }
            Some(command) => {
                debug!(
                    field = T::FIELD,
                    from = %T::observed(&current),
                    to = %desired,
                    %command,
                    "sending command"
                );
                self.exchange(transport.as_mut(), command).await
            }
        }
    }

    /// One request/reply exchange. Caller must hold the gate.
    async fn exchange(
        &self,
        transport: &mut dyn Transport,
        command: Command,
    ) -> Result<DeviceStatus> {
        let request = command.encode();
        trace!(peer = %self.peer, %command, request = %protocol::to_hex(&request), "exchange");

        let reply = transport.exchange(&request, self.command_timeout).await?;
        trace!(peer = %self.peer, reply = %protocol::to_hex(&reply), "reply");

        let status = protocol::decode_reply(&reply)?;
        self.record(&status);
        Ok(status)
    }

    fn record(&self, status: &DeviceStatus) {
        let previous = self.status_tx.send_replace(Some(status.clone()));
        for event in VentEvent::diff(previous.as_ref(), status) {
            let _ = self.event_tx.send(event);
        }
        let _ = self.event_tx.send(VentEvent::StatusUpdated(status.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ventlib_core::Error;
    use ventlib_core::frame::StatusFrame;
    use ventlib_test_harness::{MockTransport, SimulatedDvc10};

    const GET_STATUS: &[u8] = b"mobile\x01\x0d";
    const TOGGLE_POWER: &[u8] = b"mobile\x03\x0d";
    const FAN_HIGH: &[u8] = b"mobile\x04\x03";

    fn unit_with(sim: &SimulatedDvc10) -> Dvc10 {
        Dvc10::new(Box::new(sim.clone()), Duration::from_secs(2))
    }

    fn frame_bytes(frame: StatusFrame) -> Vec<u8> {
        frame.to_bytes()
    }

    #[tokio::test]
    async fn get_status_decodes_and_caches() {
        let sim = SimulatedDvc10::new().with_fan_speed(FanSpeed::Medium);
        let unit = unit_with(&sim);
        assert!(unit.last_status().is_none());

        let status = unit.get_status().await.unwrap();
        assert!(status.powered());
        assert_eq!(status.fan_speed(), FanSpeed::Medium);
        assert_eq!(unit.last_status(), Some(status));
        assert_eq!(sim.requests(), vec![GET_STATUS.to_vec()]);
    }

    #[tokio::test]
    async fn turn_on_when_already_on_sends_no_toggle() {
        let sim = SimulatedDvc10::new().with_power(true);
        let unit = unit_with(&sim);

        let status = unit.turn_on().await.unwrap();
        assert!(status.powered());
        assert_eq!(sim.requests(), vec![GET_STATUS.to_vec()]);
        assert_eq!(sim.write_count(), 0);
    }

    #[tokio::test]
    async fn turn_on_twice_toggles_once() {
        let sim = SimulatedDvc10::new().with_power(false);
        let unit = unit_with(&sim);

        assert!(unit.turn_on().await.unwrap().powered());
        assert!(unit.turn_on().await.unwrap().powered());
        assert_eq!(sim.count_of(&[0x03, 0x0D]), 1);
        assert_eq!(sim.power(), PowerState::On);
    }

    #[tokio::test]
    async fn turn_off_from_on() {
        let sim = SimulatedDvc10::new().with_power(true);
        let unit = unit_with(&sim);

        let status = unit.turn_off().await.unwrap();
        assert!(!status.powered());
        assert_eq!(sim.requests(), vec![GET_STATUS.to_vec(), TOGGLE_POWER.to_vec()]);
    }

    #[tokio::test]
    async fn set_power_follows_flag() {
        let sim = SimulatedDvc10::new().with_power(false);
        let unit = unit_with(&sim);

        assert!(!unit.set_power(false).await.unwrap().powered());
        assert!(unit.set_power(true).await.unwrap().powered());
        assert_eq!(sim.write_count(), 1);
    }

    #[tokio::test]
    async fn set_fan_speed_high_sends_preset_and_returns_reply() {
        let mock = MockTransport::new();
        mock.expect(GET_STATUS, &frame_bytes(StatusFrame::default()));
        mock.expect(
            FAN_HIGH,
            &frame_bytes(StatusFrame {
                fan_speed: FanSpeed::High,
                ..StatusFrame::default()
            }),
        );
        let unit = Dvc10::new(Box::new(mock.clone()), Duration::from_secs(2));

        let status = unit.set_fan_speed(FanSpeed::High).await.unwrap();
        assert_eq!(status.fan_speed(), FanSpeed::High);
        assert_eq!(
            protocol::to_hex(&mock.sent_data()[1]),
            "6d6f62696c650403"
        );
        assert_eq!(mock.remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn set_fan_speed_manual_rejected_without_traffic() {
        let sim = SimulatedDvc10::new();
        let unit = unit_with(&sim);

        let result = unit.set_fan_speed(FanSpeed::Manual).await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(sim.requests().is_empty());
    }

    #[tokio::test]
    async fn set_mode_party_rejected_without_traffic() {
        let sim = SimulatedDvc10::new();
        let unit = unit_with(&sim);

        let result = unit.set_mode(Mode::Party).await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(sim.requests().is_empty());
    }

    #[tokio::test]
    async fn set_mode_party_rejected_while_unit_in_party() {
        let sim = SimulatedDvc10::new().with_mode(Mode::Party);
        let unit = unit_with(&sim);

        let result = unit.set_mode(Mode::Party).await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(sim.requests().is_empty());
        assert_eq!(sim.mode(), Mode::Party);
        assert!(unit.last_status().is_none());
    }

    #[tokio::test]
    async fn set_mode_night_from_day_toggles_once() {
        let sim = SimulatedDvc10::new().with_mode(Mode::Day);
        let unit = unit_with(&sim);

        let status = unit.set_mode(Mode::Night).await.unwrap();
        assert_eq!(status.mode(), Mode::Night);
        assert_eq!(sim.count_of(&[0x09, 0x01]), 1);

        let status = unit.set_mode(Mode::Night).await.unwrap();
        assert_eq!(status.mode(), Mode::Night);
        assert_eq!(sim.count_of(&[0x09, 0x01]), 1);
    }

    #[tokio::test]
    async fn set_mode_from_party_sends_single_toggle() {
        let sim = SimulatedDvc10::new().with_mode(Mode::Party);
        let unit = unit_with(&sim);

        // The simulated unit leaves Party for Day, so asking for Night
        // reports Day and is not retried.
        let status = unit.set_mode(Mode::Night).await.unwrap();
        assert_eq!(status.mode(), Mode::Day);
        assert_eq!(sim.count_of(&[0x09, 0x01]), 1);
        assert_eq!(sim.requests().len(), 2);
    }

    #[tokio::test]
    async fn set_airflow_changes_direction() {
        let sim = SimulatedDvc10::new().with_airflow(AirflowDirection::TwoWayRecovery);
        let unit = unit_with(&sim);

        let status = unit.set_airflow(AirflowDirection::OneWayIn).await.unwrap();
        assert_eq!(status.airflow(), AirflowDirection::OneWayIn);
        assert_eq!(sim.count_of(&[0x06, 0x02]), 1);

        unit.set_airflow(AirflowDirection::OneWayIn).await.unwrap();
        assert_eq!(sim.write_count(), 1);
    }

    #[tokio::test]
    async fn timeout_leaves_cache_untouched() {
        let sim = SimulatedDvc10::new();
        let unit = unit_with(&sim);
        let before = unit.get_status().await.unwrap();

        sim.set_offline(true);
        let result = unit.get_status().await;
        assert!(matches!(result, Err(Error::Timeout)));
        assert_eq!(unit.last_status(), Some(before));
    }

    #[tokio::test]
    async fn failed_read_aborts_before_write() {
        let mock = MockTransport::new();
        mock.expect_timeout(GET_STATUS);
        let unit = Dvc10::new(Box::new(mock.clone()), Duration::from_secs(2));

        let result = unit.turn_off().await;
        assert!(matches!(result, Err(Error::Timeout)));
        assert_eq!(mock.sent_data(), vec![GET_STATUS.to_vec()]);
        assert!(unit.last_status().is_none());
    }

    #[tokio::test]
    async fn failed_write_keeps_status_from_read() {
        let mock = MockTransport::new();
        let off = frame_bytes(StatusFrame {
            power: PowerState::Off,
            ..StatusFrame::default()
        });
        mock.expect(GET_STATUS, &off);
        mock.expect_timeout(TOGGLE_POWER);
        let unit = Dvc10::new(Box::new(mock.clone()), Duration::from_secs(2));

        let result = unit.turn_on().await;
        assert!(matches!(result, Err(Error::Timeout)));
        let cached = unit.last_status().unwrap();
        assert!(!cached.powered());
    }

    #[tokio::test]
    async fn short_reply_is_malformed() {
        let mock = MockTransport::new();
        mock.expect(GET_STATUS, &[0u8; 35]);
        let unit = Dvc10::new(Box::new(mock), Duration::from_secs(2));

        let result = unit.get_status().await;
        assert!(matches!(result, Err(Error::MalformedFrame(_))));
        assert!(unit.last_status().is_none());
    }

    #[tokio::test]
    async fn events_follow_state_changes() {
        let sim = SimulatedDvc10::new().with_fan_speed(FanSpeed::Low);
        let unit = unit_with(&sim);
        unit.get_status().await.unwrap();

        let mut rx = unit.subscribe();
        unit.set_fan_speed(FanSpeed::Medium).await.unwrap();

        // The read before the write changes nothing, so only its
        // StatusUpdated is published; the write adds a field change.
        assert!(matches!(rx.try_recv().unwrap(), VentEvent::StatusUpdated(_)));
        assert!(matches!(
            rx.try_recv().unwrap(),
            VentEvent::FanSpeedChanged {
                speed: FanSpeed::Medium
            }
        ));
        assert!(matches!(rx.try_recv().unwrap(), VentEvent::StatusUpdated(_)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn concurrent_callers_are_serialized() {
        let sim = SimulatedDvc10::new().with_power(false);
        let unit = std::sync::Arc::new(unit_with(&sim));

        let a = tokio::spawn({
            let unit = unit.clone();
            async move { unit.turn_on().await }
        });
        let b = tokio::spawn({
            let unit = unit.clone();
            async move { unit.turn_on().await }
        });
        assert!(a.await.unwrap().unwrap().powered());
        assert!(b.await.unwrap().unwrap().powered());

        // The second caller reads after the first caller's toggle.
        assert_eq!(sim.count_of(&[0x03, 0x0D]), 1);
        assert_eq!(sim.power(), PowerState::On);
    }

    #[test]
    fn peer_comes_from_transport() {
        let unit = unit_with(&SimulatedDvc10::new());
        assert_eq!(unit.peer(), "simulated-dvc10");
        assert_eq!(unit.command_timeout(), Duration::from_secs(2));
    }
}
