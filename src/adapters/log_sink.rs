//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                name,
                topology,
                mode,
                volts,
            } => {
                info!(
                    "START | {} | topology={} | mode={} | battery={:.2}V",
                    name, topology, mode, volts
                );
            }
            AppEvent::Halted(e) => {
                error!("HALT  | {}", e);
            }
            AppEvent::BatterySampled { volts } => {
                info!("BATT  | {:.2}V", volts);
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE  | {} -> {}", from, to);
            }
            AppEvent::BeamFired { channel } => {
                info!("LATCH | beam {} fired", channel + 1);
            }
            AppEvent::TripCounted { total } => {
                info!("COUNT | trips={}", total);
            }
            AppEvent::CaptureChecked {
                channels,
                interruptions,
                verdict,
            } => {
                info!(
                    "SWEEP | channels={:?} | interruptions={} | verdict={:?}",
                    channels.as_slice(),
                    interruptions,
                    verdict
                );
            }
            AppEvent::Suspended => {
                info!("LATCH | suspended until reset");
            }
            AppEvent::Reconnected(addr) => {
                info!("NET   | reconnected as {}", addr);
            }
            AppEvent::NotificationDropped(e) => {
                warn!("MAIL  | dropped: {}", e);
            }
        }
    }
}
