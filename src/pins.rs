//! GPIO / peripheral pin assignments for the mousetrap controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Beam-break receivers (IR, open-collector, pulled up)
// ---------------------------------------------------------------------------

/// Beam 1 receiver.  LOW = beam interrupted.
pub const BEAM_1_GPIO: i32 = 4;
/// Beam 2 receiver.  LOW = beam interrupted.
pub const BEAM_2_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Trap-door solenoids (logic-level MOSFET low-side switch)
// ---------------------------------------------------------------------------

/// Digital output: HIGH = solenoid 1 energised.
pub const SOLENOID_1_GPIO: i32 = 6;
/// Digital output: HIGH = solenoid 2 energised.
pub const SOLENOID_2_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Identity straps (solder jumpers to GND, pulled up)
// ---------------------------------------------------------------------------

pub const STRAP_1_GPIO: i32 = 8;
pub const STRAP_2_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// Solenoid battery monitor (ADC1)
// ---------------------------------------------------------------------------

/// Resistive divider from the solenoid battery.
/// ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const BATTERY_ADC_GPIO: i32 = 1;
pub const BATTERY_ADC_CHANNEL: u32 = 0;

// ---------------------------------------------------------------------------
// Status LED (discrete, active HIGH)
// ---------------------------------------------------------------------------

pub const LED_GPIO: i32 = 2;

/// Beam receiver pins indexed by channel.
pub const BEAM_GPIOS: [i32; 2] = [BEAM_1_GPIO, BEAM_2_GPIO];
/// Solenoid driver pins indexed by channel.
pub const SOLENOID_GPIOS: [i32; 2] = [SOLENOID_1_GPIO, SOLENOID_2_GPIO];
