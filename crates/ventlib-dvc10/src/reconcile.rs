//! Read-then-conditionally-write reconciliation.
//!
//! Every settable field follows the same strategy: read the current status,
//! compare the observed value with the desired one, and send at most one
//! command when they differ. The [`Reconcile`] trait captures the per-field
//! parts (how to observe the value, which command moves the unit toward it)
//! so the controller runs one generic procedure for power, mode, fan speed,
//! and airflow.
//!
//! Toggle commands only make sense after a fresh read: sending one blindly
//! would flip whatever the unit happens to be in.

use std::fmt;

use ventlib_core::error::{Error, Result};
use ventlib_core::status::DeviceStatus;
use ventlib_core::types::{AirflowDirection, FanSpeed, Mode, PowerState};

use crate::commands::Command;

/// A settable unit field.
pub trait Reconcile: Copy + PartialEq + fmt::Display + Send + Sync + 'static {
    /// Field name used in logs.
    const FIELD: &'static str;

    /// The value of this field in `status`.
    fn observed(status: &DeviceStatus) -> Self;

    /// The command that moves the unit toward `self` when it differs.
    ///
    /// Returns [`Error::InvalidArgument`] for values that cannot be
    /// commanded at all, regardless of the current state.
    fn command(self) -> Result<Command>;
}

impl Reconcile for PowerState {
    const FIELD: &'static str = "power";

    fn observed(status: &DeviceStatus) -> Self {
        status.power_state()
    }

    fn command(self) -> Result<Command> {
        Ok(Command::TogglePower)
    }
}

impl Reconcile for Mode {
    const FIELD: &'static str = "mode";

    fn observed(status: &DeviceStatus) -> Self {
        status.mode()
    }

    // From Party a single toggle lands on whatever the unit picks; no
    // second attempt is made.
    fn command(self) -> Result<Command> {
        match self {
            Mode::Day | Mode::Night => Ok(Command::ToggleDayNight),
            Mode::Party => Err(Error::InvalidArgument(
                "party mode cannot be commanded".into(),
            )),
        }
    }
}

impl Reconcile for FanSpeed {
    const FIELD: &'static str = "fan_speed";

    fn observed(status: &DeviceStatus) -> Self {
        status.fan_speed()
    }

    fn command(self) -> Result<Command> {
        Command::fan_speed(self)
    }
}

impl Reconcile for AirflowDirection {
    const FIELD: &'static str = "airflow";

    fn observed(status: &DeviceStatus) -> Self {
        status.airflow()
    }

    fn command(self) -> Result<Command> {
        Ok(Command::airflow(self))
    }
}

/// Decide which command, if any, reconciles `current` with `desired`.
///
/// `Ok(None)` means the unit already matches and nothing should be sent.
pub fn reconcile<T: Reconcile>(desired: T, current: &DeviceStatus) -> Result<Option<Command>> {
    let command = desired.command()?;
    if T::observed(current) == desired {
        Ok(None)
    } else {
        Ok(Some(command))
    }
}
