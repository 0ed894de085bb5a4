//! IR beam-break receivers.
//!
//! The receiver output is open-collector with the input pulled up: HIGH
//! while the beam reaches it, LOW while something blocks it.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads real GPIO levels via hw_init helpers.
//! On host/test: reads from static atomics for injection.

use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::fsm::MAX_CHANNELS;

static SIM_INTERRUPTED: [AtomicBool; MAX_CHANNELS] = [AtomicBool::new(false), AtomicBool::new(false)];

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_interrupted(channel: usize, interrupted: bool) {
    if let Some(slot) = SIM_INTERRUPTED.get(channel) {
        slot.store(interrupted, Ordering::Relaxed);
    }
}

pub struct BeamSensor {
    channel: usize,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    gpio: i32,
}

impl BeamSensor {
    pub fn new(channel: usize, gpio: i32) -> Self {
        Self {
            channel,
            gpio,
        }
    }

    /// `true` while the beam is blocked.
    pub fn is_interrupted(&self) -> bool {
        !self.read_level()
    }

    #[cfg(target_os = "espidf")]
    fn read_level(&self) -> bool {
        hw_init::gpio_read(self.gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_level(&self) -> bool {
        !SIM_INTERRUPTED
            .get(self.channel)
            .is_some_and(|s| s.load(Ordering::Relaxed))
    }

    pub fn channel(&self) -> usize {
        self.channel
    }
}
