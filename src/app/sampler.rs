//! Solenoid battery voltage sampling.
//!
//! The first conversion after an idle period reads several hundred
//! millivolts off, so every sample takes two reads a settle delay apart
//! and keeps only the second.

use embedded_hal::delay::DelayNs;

use super::ports::SensorPort;

#[derive(Debug, Clone, Copy)]
pub struct VoltageSampler {
    /// Volts at ADC full scale.
    calibration: f32,
    full_scale: u16,
    settle_ms: u32,
}

impl VoltageSampler {
    pub fn new(calibration: f32, full_scale: u16, settle_ms: u32) -> Self {
        Self {
            calibration,
            full_scale: full_scale.max(1),
            settle_ms,
        }
    }

    /// Battery volts, rounded to two decimal places.  An absent battery
    /// reads near zero.
    pub fn sample<S, D>(&self, sensor: &mut S, delay: &mut D) -> f32
    where
        S: SensorPort + ?Sized,
        D: DelayNs + ?Sized,
    {
        let _ = sensor.read_battery_raw();
        delay.delay_ms(self.settle_ms);
        let raw = sensor.read_battery_raw();
        self.scale(raw)
    }

    fn scale(&self, raw: u16) -> f32 {
        let volts = f32::from(raw) / f32::from(self.full_scale) * self.calibration;
        (volts * 100.0).round() / 100.0
    }
}
