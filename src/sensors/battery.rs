//! Solenoid battery divider on ADC1.
//!
//! Only returns raw counts; scaling and the double-read workaround live in
//! [`VoltageSampler`](crate::app::sampler::VoltageSampler).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the oneshot ADC channel initialised by hw_init.
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_BATTERY_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_battery_adc(raw: u16) {
    SIM_BATTERY_ADC.store(raw, Ordering::Relaxed);
}

pub struct BatteryMonitor {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    channel: u32,
}

impl BatteryMonitor {
    pub fn new(channel: u32) -> Self {
        Self { channel }
    }

    #[cfg(target_os = "espidf")]
    pub fn read_raw(&self) -> u16 {
        hw_init::adc1_read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read_raw(&self) -> u16 {
        SIM_BATTERY_ADC.load(Ordering::Relaxed)
    }
}
