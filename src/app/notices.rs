//! Notification texts.
//!
//! Every outbound message is built here so the wording stays in one place.
//! Subjects carry the trap name and its network address so a recipient
//! with several traps can tell them apart at a glance.

use core::net::Ipv4Addr;

use super::service::{OperatingMode, Verdict};

/// Firmware banner quoted in the start-up message.
pub const VERSION: &str = concat!("Mousetrap v", env!("CARGO_PKG_VERSION"));

/// A rendered subject/body pair ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub subject: String,
    pub body: String,
}

impl Notice {
    pub fn startup(name: &str, address: Ipv4Addr, mode: OperatingMode, volts: f32) -> Self {
        Self {
            subject: format!("{name} @ {address} start-up message"),
            body: format!(
                "{VERSION}: {name} has started in {mode} mode and is waiting for a mouse. \
                 Solenoid battery voltage is {volts:.2} volts"
            ),
        }
    }

    /// `channel` is 0-based; the message numbers beams from 1.
    pub fn beam_tripped(name: &str, address: Ipv4Addr, channel: usize, sweep_secs: u32) -> Self {
        Self {
            subject: format!("beam {} of {name} @ {address} has tripped", channel + 1),
            body: format!(
                "A {sweep_secs} second count has started to detect further movement."
            ),
        }
    }

    pub fn capture(name: &str, address: Ipv4Addr, verdict: Verdict) -> Self {
        match verdict {
            Verdict::ProbableCatch => Self {
                subject: format!("{name} @ {address} has probably got a mouse!"),
                body: format!(
                    "{name} is now in wait mode - additional movement detected. Check trap."
                ),
            },
            Verdict::NoMovement => Self {
                subject: format!("{name} @ {address} - It's probably not a mouse"),
                body: format!(
                    "{name} is now in wait mode - no additional movement detected. \
                     Check trap and reset as required."
                ),
            },
        }
    }

    pub fn low_battery(name: &str, address: Ipv4Addr, volts: f32) -> Self {
        Self {
            subject: format!("{name} @ {address} battery message"),
            body: format!(
                "{name} solenoid battery voltage is {volts:.2} volts. Consider replacement."
            ),
        }
    }

    /// Daily status.  A suspended trap reports that it needs a reset
    /// regardless of mode.
    pub fn status(
        name: &str,
        address: Ipv4Addr,
        mode: OperatingMode,
        volts: f32,
        trip_count: u32,
        suspended: bool,
    ) -> Self {
        if suspended {
            return Self {
                subject: format!("{name} @ {address} is awaiting reset"),
                body: format!(
                    "{name} has finished its capture check and is waiting to be reset. \
                     The battery voltage is {volts:.2}."
                ),
            };
        }
        match mode {
            OperatingMode::Armed => Self {
                subject: format!("{name} @ {address} is waiting"),
                body: format!(
                    "{name} is waiting to catch a mouse. The battery voltage is {volts:.2}."
                ),
            },
            OperatingMode::Counting => Self {
                subject: format!("{name} @ {address} mouse-activity mode"),
                body: format!("{name} is in mouse-activity mode. The trip count is {trip_count}."),
            },
        }
    }
}
