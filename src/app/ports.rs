//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TrapController / MainLoop (domain)
//! ```
//!
//! Driven adapters (GPIO, ADC, WiFi, SNTP, SMTP, log sink) implement these
//! traits.  The domain receives them bundled in [`Ports`] on every call, so
//! it never owns or touches hardware directly.

use core::net::Ipv4Addr;

use embedded_hal::delay::DelayNs;

use crate::clock::WallClock;
use crate::error::{ClockError, ConnectivityError, NotifyError};

use super::events::AppEvent;
use super::notices::Notice;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// `true` while the beam on `channel` (0-based) is broken.
    fn beam_interrupted(&mut self, channel: usize) -> bool;

    /// One raw ADC conversion of the solenoid battery divider.
    fn read_battery_raw(&mut self) -> u16;

    /// Raw levels of the two identity straps (0 or 1 each).
    fn read_straps(&mut self) -> (u8, u8);
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Energise or release the solenoid on `channel` (0-based).
    fn set_solenoid(&mut self, channel: usize, energised: bool);

    /// Release every solenoid.
    fn release_solenoids(&mut self);

    /// Drive the status LED.
    fn set_led(&mut self, on: bool);
}

/// Anything that is both a sensor and an actuator port.
///
/// Lets a single adapter be passed as one `&mut dyn` without a double
/// mutable borrow.
pub trait HardwarePort: SensorPort + ActuatorPort {}

impl<T: SensorPort + ActuatorPort> HardwarePort for T {}

// ───────────────────────────────────────────────────────────────
// Notification port (driven adapter: domain → mail relay)
// ───────────────────────────────────────────────────────────────

/// Best-effort delivery of a [`Notice`].  Callers never retry.
pub trait NotificationPort {
    fn send(&mut self, at: &WallClock, notice: &Notice) -> Result<(), NotifyError>;
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain ↔ WiFi)
// ───────────────────────────────────────────────────────────────

/// One association attempt per `connect()` call; the domain owns the
/// retry policy.
pub trait ConnectivityPort {
    /// Associate and obtain an address.
    fn connect(&mut self) -> Result<Ipv4Addr, ConnectivityError>;
    /// Whether the last association is still up.
    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: domain ↔ SNTP / RTC)
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// One synchronisation attempt against the configured time server.
    fn sync(&mut self) -> Result<(), ClockError>;

    /// Current UTC time in Unix seconds.
    fn unix_time(&self) -> i64;

    /// Force the clock (used for the unsynced fallback).
    fn set_unix_time(&mut self, secs: i64);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.  Adapters
/// decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Port bundle
// ───────────────────────────────────────────────────────────────

/// Every driven port the domain needs for one call.
///
/// Built once in `main` (or a test) and lent to
/// [`MainLoop`](super::runner::MainLoop) on every cycle.
pub struct Ports<'a> {
    pub hw: &'a mut dyn HardwarePort,
    pub delay: &'a mut dyn DelayNs,
    pub mail: &'a mut dyn NotificationPort,
    pub net: &'a mut dyn ConnectivityPort,
    pub clock: &'a mut dyn ClockPort,
    pub events: &'a mut dyn EventSink,
}
