//! Background status polling.
//!
//! The unit never pushes state, so anything that wants to track it has to
//! ask. [`StatusPoller`] reads the status on a fixed interval (the first read
//! happens immediately) and on demand via [`StatusPoller::refresh`]. Results
//! reach subscribers through the controller's event channel; failures are
//! logged and published as [`VentEvent::UpdateFailed`](ventlib_core::VentEvent::UpdateFailed).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use ventlib_core::error::{Error, Result};

use crate::controller::Dvc10;

/// Default interval between scheduled status reads.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Handle to a running polling task.
///
/// Dropping the handle stops the task; [`shutdown`](Self::shutdown) also
/// waits for it to finish.
pub struct StatusPoller {
    cancel: CancellationToken,
    refresh_tx: mpsc::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl StatusPoller {
    /// Start polling `unit` every `interval`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(unit: Arc<Dvc10>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::InvalidArgument(
                "poll interval must be greater than zero".into(),
            ));
        }

        let cancel = CancellationToken::new();
        // Capacity 1: refresh requests made while one is pending coalesce.
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        let task = tokio::spawn(poll_loop(unit, interval, refresh_rx, cancel.clone()));

        Ok(StatusPoller {
            cancel,
            refresh_tx,
            task: Some(task),
        })
    }

    /// Request an immediate status read without waiting for the next tick.
    pub fn refresh(&self) {
        let _ = self.refresh_tx.try_send(());
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop polling and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_loop(
    unit: Arc<Dvc10>,
    interval: Duration,
    mut refresh_rx: mpsc::Receiver<()>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(
        peer = %unit.peer(),
        interval_ms = interval.as_millis() as u64,
        "status poller started"
    );

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,
            Some(()) = refresh_rx.recv() => trace!("refresh requested"),
            _ = ticker.tick() => {}
        }

        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,
            _ = poll_once(&unit) => {}
        }
    }

    debug!(peer = %unit.peer(), "status poller stopped");
}

async fn poll_once(unit: &Dvc10) {
    match unit.get_status().await {
        Ok(status) => trace!(peer = %unit.peer(), %status, "status refreshed"),
        Err(e) => {
            warn!(peer = %unit.peer(), error = %e, "status refresh failed");
            unit.publish_update_failure(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ventlib_core::VentEvent;
    use ventlib_test_harness::SimulatedDvc10;

    use crate::builder::Dvc10Builder;

    fn unit_with(sim: &SimulatedDvc10) -> Arc<Dvc10> {
        Arc::new(
            Dvc10Builder::new("sim")
                .build_with_transport(Box::new(sim.clone()))
                .unwrap(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn first_poll_is_immediate() {
        let sim = SimulatedDvc10::new();
        let unit = unit_with(&sim);
        let mut rx = unit.subscribe();

        let poller = StatusPoller::spawn(unit.clone(), DEFAULT_POLL_INTERVAL).unwrap();
        loop {
            if let VentEvent::StatusUpdated(_) = rx.recv().await.unwrap() {
                break;
            }
        }
        assert!(unit.last_status().is_some());
        assert_eq!(sim.requests().len(), 1);
        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn polls_on_interval() {
        let sim = SimulatedDvc10::new();
        let unit = unit_with(&sim);
        let poller = StatusPoller::spawn(unit, Duration::from_secs(30)).unwrap();

        tokio::time::sleep(Duration::from_secs(95)).await;
        // t = 0, 30, 60, 90
        assert_eq!(sim.requests().len(), 4);
        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_polls_between_ticks() {
        let sim = SimulatedDvc10::new();
        let unit = unit_with(&sim);
        let poller = StatusPoller::spawn(unit, Duration::from_secs(30)).unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(sim.requests().len(), 1);

        poller.refresh();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(sim.requests().len(), 2);
        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failure_publishes_update_failed_and_keeps_polling() {
        let sim = SimulatedDvc10::new();
        sim.set_offline(true);
        let unit = unit_with(&sim);
        let mut rx = unit.subscribe();
        let poller = StatusPoller::spawn(unit.clone(), Duration::from_secs(30)).unwrap();

        match rx.recv().await.unwrap() {
            VentEvent::UpdateFailed { reason } => assert!(reason.contains("timeout")),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(unit.last_status().is_none());

        sim.set_offline(false);
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(unit.last_status().is_some());
        assert!(poller.is_running());
        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_polling() {
        let sim = SimulatedDvc10::new();
        let unit = unit_with(&sim);
        let poller = StatusPoller::spawn(unit, Duration::from_secs(30)).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        poller.shutdown().await;

        let before = sim.requests().len();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(sim.requests().len(), before);
    }

    #[tokio::test]
    async fn zero_interval_rejected() {
        let unit = unit_with(&SimulatedDvc10::new());
        let result = StatusPoller::spawn(unit, Duration::ZERO);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
