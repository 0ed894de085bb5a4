//! Outbound application events.
//!
//! The [`TrapController`](super::service::TrapController) and
//! [`MainLoop`](super::runner::MainLoop) emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use core::net::Ipv4Addr;

use crate::error::{Error, NotifyError};
use crate::fsm::MAX_CHANNELS;
use crate::identity::Topology;

use super::service::{OperatingMode, Verdict};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Start-up completed; the loop is running.
    Started {
        name: &'static str,
        topology: Topology,
        mode: OperatingMode,
        volts: f32,
    },

    /// Start-up failed; the loop will not run.
    Halted(Error),

    /// A battery sample was taken.
    BatterySampled { volts: f32 },

    /// The operating mode flipped after a battery sample.
    ModeChanged { from: OperatingMode, to: OperatingMode },

    /// An armed beam fired its door.
    BeamFired { channel: usize },

    /// A beam break was counted in activity mode.
    TripCounted { total: u32 },

    /// A confirmation sweep finished.
    CaptureChecked {
        channels: heapless::Vec<usize, MAX_CHANNELS>,
        interruptions: u32,
        verdict: Verdict,
    },

    /// The trap stopped sensing until reset.
    Suspended,

    /// The daily reconnect succeeded.
    Reconnected(Ipv4Addr),

    /// A notification could not be delivered.
    NotificationDropped(NotifyError),
}
