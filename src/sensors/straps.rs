//! Identity strap jumpers.  Read once at start-up.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the pulled-up strap GPIOs.
//! On host/test: reads from static atomics (default 0, 0).

use core::sync::atomic::{AtomicU8, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_STRAPS: [AtomicU8; 2] = [AtomicU8::new(0), AtomicU8::new(0)];

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_straps(strap1: u8, strap2: u8) {
    SIM_STRAPS[0].store(strap1, Ordering::Relaxed);
    SIM_STRAPS[1].store(strap2, Ordering::Relaxed);
}

pub struct StrapReader {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    gpios: [i32; 2],
}

impl StrapReader {
    pub fn new(strap1_gpio: i32, strap2_gpio: i32) -> Self {
        Self {
            gpios: [strap1_gpio, strap2_gpio],
        }
    }

    #[cfg(target_os = "espidf")]
    pub fn read(&self) -> (u8, u8) {
        (
            u8::from(hw_init::gpio_read(self.gpios[0])),
            u8::from(hw_init::gpio_read(self.gpios[1])),
        )
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&self) -> (u8, u8) {
        (
            SIM_STRAPS[0].load(Ordering::Relaxed),
            SIM_STRAPS[1].load(Ordering::Relaxed),
        )
    }
}
