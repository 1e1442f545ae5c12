//! Print unit events as the status poller picks them up.
//!
//! Changes made with the unit's own control panel or remote show up here
//! within one poll interval.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p ventlib --example monitor_events -- 192.168.1.50
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ventlib::VentEvent;
use ventlib::dvc10::{Dvc10Builder, StatusPoller};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let host = std::env::args()
        .nth(1)
        .context("usage: monitor_events <host>")?;

    let unit = Arc::new(Dvc10Builder::new(&host).build()?);
    let mut events = unit.subscribe();
    let _poller = StatusPoller::spawn(unit.clone(), Duration::from_secs(10))?;

    println!("Monitoring {} (Ctrl-C to stop)", unit.peer());
    while let Ok(event) = events.recv().await {
        match event {
            VentEvent::StatusUpdated(status) => println!("status: {status}"),
            VentEvent::UpdateFailed { reason } => println!("unreachable: {reason}"),
            other => println!("{other:?}"),
        }
    }
    Ok(())
}
