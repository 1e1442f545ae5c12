// ventlib test application -- CLI tool for driving a DVC 10 ventilation unit
// from the command line, against real hardware or an in-process simulator.
//
// Usage:
//   ventlib-test-app --host 192.168.1.50 status
//   ventlib-test-app --host 192.168.1.50 on
//   ventlib-test-app --host 192.168.1.50 fan high
//   ventlib-test-app --host 192.168.1.50 mode night
//   ventlib-test-app --host 192.168.1.50 airflow recovery
//   ventlib-test-app --host 192.168.1.50 monitor --interval 30
//   ventlib-test-app --mock check
//   VENTLIB_HOST=192.168.1.50 ventlib-test-app -v status

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use ventlib::dvc10::{DEFAULT_POLL_INTERVAL, Dvc10, Dvc10Builder, StatusPoller};
use ventlib::transport::DEFAULT_PORT;
use ventlib::{AirflowDirection, DeviceStatus, FanSpeed, Mode, VentEvent};
use ventlib_test_harness::SimulatedDvc10;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// ventlib test application -- controls a DVC 10 unit from the command line.
#[derive(Parser)]
#[command(name = "ventlib-test-app", version, about)]
struct Cli {
    /// Unit host name or IP address. Required unless --mock is used.
    #[arg(long, env = "VENTLIB_HOST")]
    host: Option<String>,

    /// Unit UDP port.
    #[arg(long, env = "VENTLIB_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Reply timeout per request, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    timeout_ms: u64,

    /// Talk to an in-process simulated unit instead of the network.
    #[arg(long)]
    mock: bool,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read and print the unit status.
    Status,

    /// Check that the unit answers (exit status 1 if it does not).
    Check,

    /// Turn the unit on.
    On,

    /// Turn the unit off.
    Off,

    /// Select a fan speed preset.
    Fan {
        /// low, medium or high.
        speed: FanSpeed,
    },

    /// Switch between day and night mode.
    Mode {
        /// day or night.
        mode: Mode,
    },

    /// Set the airflow direction.
    Airflow {
        /// out, recovery or in.
        direction: AirflowDirection,
    },

    /// Poll the unit and print events as they arrive.
    Monitor {
        /// Seconds between status reads.
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
        interval: u64,

        /// Duration in seconds (0 = run until Ctrl-C).
        #[arg(long, default_value_t = 0)]
        duration: u64,
    },
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn create_unit(cli: &Cli) -> Result<Dvc10> {
    let timeout = Duration::from_millis(cli.timeout_ms);

    if cli.mock {
        let builder = Dvc10Builder::new("simulated").command_timeout(timeout);
        return builder
            .build_with_transport(Box::new(SimulatedDvc10::new()))
            .context("failed to build simulated unit");
    }

    let Some(host) = cli.host.as_deref() else {
        bail!("--host (or VENTLIB_HOST) is required unless --mock is used");
    };

    Dvc10Builder::new(host)
        .port(cli.port)
        .command_timeout(timeout)
        .build()
        .with_context(|| format!("invalid unit address {host}:{}", cli.port))
}

fn print_status(status: &DeviceStatus) {
    println!("Unit Status");
    println!("  Power:          {}", status.power_state());
    println!("  Mode:           {}", status.mode());
    println!("  Fan speed:      {}", status.fan_speed());
    println!("  Manual speed:   {}%", status.manual_speed_percent());
    println!("  Airflow:        {}", status.airflow().label());
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_status(unit: &Dvc10) -> Result<()> {
    let status = unit
        .get_status()
        .await
        .with_context(|| format!("failed to read status from {}", unit.peer()))?;
    print_status(&status);
    Ok(())
}

async fn cmd_check(unit: &Dvc10) -> Result<()> {
    let start = Instant::now();
    match unit.get_status().await {
        Ok(status) => {
            println!(
                "OK: {} answered in {} ms ({})",
                unit.peer(),
                start.elapsed().as_millis(),
                status.summary()
            );
            Ok(())
        }
        Err(e) if e.is_communication_failure() => {
            bail!("cannot connect to {}: {e}", unit.peer())
        }
        Err(e) => Err(e.into()),
    }
}

async fn cmd_monitor(unit: Arc<Dvc10>, interval_secs: u64, duration_secs: u64) -> Result<()> {
    let mut event_rx = unit.subscribe();
    let poller = StatusPoller::spawn(unit.clone(), Duration::from_secs(interval_secs))
        .context("failed to start status poller")?;

    println!(
        "Monitoring {} every {interval_secs}s (Ctrl-C to stop)...",
        unit.peer()
    );

    let deadline = async {
        if duration_secs > 0 {
            tokio::time::sleep(Duration::from_secs(duration_secs)).await;
        } else {
            std::future::pending::<()>().await;
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                println!("Monitor duration elapsed.");
                break;
            }
            _ = tokio::signal::ctrl_c() => break,
            event = event_rx.recv() => match event {
                Ok(VentEvent::StatusUpdated(status)) => println!("[status] {status}"),
                Ok(VentEvent::UpdateFailed { reason }) => println!("[error] {reason}"),
                Ok(event) => println!("[event] {event:?}"),
                Err(RecvError::Lagged(n)) => {
                    println!("[warning] missed {n} events (consumer too slow)");
                }
                Err(RecvError::Closed) => {
                    println!("Event channel closed.");
                    break;
                }
            },
        }
    }

    poller.shutdown().await;
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let unit = create_unit(&cli)?;
    tracing::debug!(peer = %unit.peer(), "unit ready");

    match cli.command {
        Command::Status => cmd_status(&unit).await,
        Command::Check => cmd_check(&unit).await,
        Command::On => {
            print_status(&unit.turn_on().await.context("failed to turn unit on")?);
            Ok(())
        }
        Command::Off => {
            print_status(&unit.turn_off().await.context("failed to turn unit off")?);
            Ok(())
        }
        Command::Fan { speed } => {
            let status = unit
                .set_fan_speed(speed)
                .await
                .with_context(|| format!("failed to set fan speed {speed}"))?;
            print_status(&status);
            Ok(())
        }
        Command::Mode { mode } => {
            let status = unit
                .set_mode(mode)
                .await
                .with_context(|| format!("failed to set mode {mode}"))?;
            if status.mode() != mode {
                println!("Note: unit reports {} after one toggle", status.mode());
            }
            print_status(&status);
            Ok(())
        }
        Command::Airflow { direction } => {
            let status = unit
                .set_airflow(direction)
                .await
                .with_context(|| format!("failed to set airflow {direction}"))?;
            print_status(&status);
            Ok(())
        }
        Command::Monitor { interval, duration } => {
            cmd_monitor(Arc::new(unit), interval, duration).await
        }
    }
}
