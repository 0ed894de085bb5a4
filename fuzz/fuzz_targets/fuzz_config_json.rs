//! Fuzz target: `SystemConfig` deserialisation + validation
//!
//! Any JSON that deserialises and validates must describe a usable trap:
//! a non-zero sweep and a battery floor below the low-battery warning.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use mousetrap::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(config) = serde_json::from_slice::<SystemConfig>(data) else {
        return;
    };
    if config.validate().is_ok() {
        assert!(config.loop_interval_ms > 0);
        assert!(config.battery_present_volts < config.low_battery_volts);
        for i in 0..8 {
            assert!(config.tuning(i).hourly_ticks > 0);
        }
    }
});
