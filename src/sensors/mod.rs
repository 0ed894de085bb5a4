//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].

pub mod battery;
pub mod beam;
pub mod straps;

use battery::BatteryMonitor;
use beam::BeamSensor;
use straps::StrapReader;

use crate::fsm::MAX_CHANNELS;

/// Owns every input on the board.
pub struct SensorHub {
    pub beams: [BeamSensor; MAX_CHANNELS],
    pub battery: BatteryMonitor,
    pub straps: StrapReader,
}

impl SensorHub {
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(beams: [BeamSensor; MAX_CHANNELS], battery: BatteryMonitor, straps: StrapReader) -> Self {
        Self {
            beams,
            battery,
            straps,
        }
    }

    /// `true` while the beam on `channel` is blocked.  Channels the board
    /// does not have read as clear.
    pub fn beam_interrupted(&self, channel: usize) -> bool {
        self.beams
            .get(channel)
            .is_some_and(BeamSensor::is_interrupted)
    }
}
