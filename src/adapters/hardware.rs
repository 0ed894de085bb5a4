//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and all actuator drivers, exposing them
//! through [`SensorPort`] and [`ActuatorPort`].  On non-espidf targets,
//! the underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::solenoid::SolenoidDriver;
use crate::drivers::status_led::StatusLed;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    solenoids: SolenoidDriver,
    led: StatusLed,
}

impl HardwareAdapter {
    pub fn new(sensor_hub: SensorHub, solenoids: SolenoidDriver, led: StatusLed) -> Self {
        Self {
            sensor_hub,
            solenoids,
            led,
        }
    }

    pub fn solenoids(&self) -> &SolenoidDriver {
        &self.solenoids
    }

    pub fn led(&self) -> &StatusLed {
        &self.led
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn beam_interrupted(&mut self, channel: usize) -> bool {
        self.sensor_hub.beam_interrupted(channel)
    }

    fn read_battery_raw(&mut self) -> u16 {
        self.sensor_hub.battery.read_raw()
    }

    fn read_straps(&mut self) -> (u8, u8) {
        self.sensor_hub.straps.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_solenoid(&mut self, channel: usize, energised: bool) {
        self.solenoids.set(channel, energised);
    }

    fn release_solenoids(&mut self) {
        self.solenoids.release_all();
    }

    fn set_led(&mut self, on: bool) {
        self.led.set(on);
    }
}
