//! Trap-door solenoid driver.
//!
//! Each solenoid hangs off a logic-level MOSFET; HIGH energises the coil.
//! Coils are only ever pulsed, so the driver keeps no timing of its own.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the solenoid GPIOs via hw_init.
//! On host/test: tracks state in-memory only.

use log::info;

use crate::drivers::hw_init;
use crate::fsm::MAX_CHANNELS;

pub struct SolenoidDriver {
    gpios: [i32; MAX_CHANNELS],
    energised: [bool; MAX_CHANNELS],
}

impl SolenoidDriver {
    pub fn new(gpios: [i32; MAX_CHANNELS]) -> Self {
        Self {
            gpios,
            energised: [false; MAX_CHANNELS],
        }
    }

    /// Energise or release one coil.  Out-of-range channels are ignored.
    pub fn set(&mut self, channel: usize, energised: bool) {
        let Some(&gpio) = self.gpios.get(channel) else {
            return;
        };
        hw_init::gpio_write(gpio, energised);
        self.energised[channel] = energised;
        if energised {
            info!("Solenoid {}: energised", channel + 1);
        }
    }

    pub fn release_all(&mut self) {
        for (&gpio, on) in self.gpios.iter().zip(self.energised.iter_mut()) {
            hw_init::gpio_write(gpio, false);
            *on = false;
        }
    }

    pub fn is_energised(&self, channel: usize) -> bool {
        self.energised.get(channel).copied().unwrap_or(false)
    }
}
