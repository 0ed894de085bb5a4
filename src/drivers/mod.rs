//! Actuator drivers and one-shot peripheral initialisation.

pub mod hw_init;
pub mod solenoid;
pub mod status_led;
