//! System configuration parameters
//!
//! All tunable parameters for the mousetrap.  Timing and thresholds live in
//! [`SystemConfig`]; credentials baked in at build time live in
//! [`NetworkConfig`] and [`MailConfig`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tuning rows: one per strapped trap plus the fallback row.
pub const DEVICE_COUNT: usize = 5;

/// Per-device calibration, indexed by [`TrapId`](crate::identity::TrapId).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceTuning {
    /// Volts at ADC full scale (accounts for the resistive divider).
    pub battery_cal: f32,
    /// Loop ticks that make up one hour on this board.
    pub hourly_ticks: u32,
}

impl Default for DeviceTuning {
    fn default() -> Self {
        Self {
            battery_cal: 5.0,
            hourly_ticks: 35_751,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Daily report ---
    /// Local hour (0-23) at which the status notification is sent
    pub report_hour: u8,
    /// Local minute (0-59) at which the status notification is sent
    pub report_minute: u8,
    /// Whole-hour offset from UTC applied to the synced clock
    pub utc_offset_hours: i8,

    // --- Main loop ---
    /// Loop cadence (milliseconds)
    pub loop_interval_ms: u32,
    /// Heartbeat LED toggles once every this many ticks
    pub heartbeat_period_ticks: u32,

    // --- Actuation & confirmation ---
    /// How long a fired solenoid stays energised (milliseconds)
    pub solenoid_hold_ms: u32,
    /// Pause between closing the trap and starting the sweep (milliseconds)
    pub confirm_settle_ms: u32,
    /// Length of the capture-confirmation sweep (seconds)
    pub confirm_sweep_secs: u32,
    /// Interval between beam polls during the sweep (milliseconds)
    pub confirm_poll_ms: u32,
    /// Cooldown after each detection in counting mode (milliseconds)
    pub counting_cooldown_ms: u32,

    // --- Battery ---
    /// Delay between the discarded and the kept ADC read (milliseconds)
    pub adc_settle_ms: u32,
    /// Raw ADC value corresponding to `battery_cal` volts
    pub adc_full_scale: u16,
    /// Readings above this mean a solenoid battery is fitted (volts)
    pub battery_present_volts: f32,
    /// Readings below this (and above present) trigger a warning (volts)
    pub low_battery_volts: f32,

    // --- Retry ---
    /// Network association attempts at start-up
    pub connect_attempts: u8,
    /// Pause between association attempts (milliseconds)
    pub connect_retry_delay_ms: u32,
    /// Clock synchronisation attempts at start-up
    pub clock_sync_attempts: u8,
    /// Pause between clock synchronisation attempts (milliseconds)
    pub clock_sync_retry_ms: u32,

    // --- Per-device ---
    pub devices: [DeviceTuning; DEVICE_COUNT],
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Daily report
            report_hour: 12,
            report_minute: 0,
            utc_offset_hours: 0,

            // Main loop
            loop_interval_ms: 100, // 10 Hz
            heartbeat_period_ticks: 20,

            // Actuation & confirmation
            solenoid_hold_ms: 200,
            confirm_settle_ms: 1000,
            confirm_sweep_secs: 60,
            confirm_poll_ms: 100,
            counting_cooldown_ms: 1000,

            // Battery
            adc_settle_ms: 1000,
            adc_full_scale: 4095, // 12-bit ADC1
            battery_present_volts: 2.0,
            low_battery_volts: 4.2,

            // Retry
            connect_attempts: 10,
            connect_retry_delay_ms: 1000,
            clock_sync_attempts: 10,
            clock_sync_retry_ms: 2000,

            devices: [DeviceTuning::default(); DEVICE_COUNT],
        }
    }
}

impl SystemConfig {
    /// Reject values that would leave the trap in an inconsistent state.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report_hour > 23 {
            return Err(ConfigError::ValidationFailed("report_hour must be 0-23"));
        }
        if self.report_minute > 59 {
            return Err(ConfigError::ValidationFailed("report_minute must be 0-59"));
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(ConfigError::ValidationFailed("utc_offset_hours must be -12..=14"));
        }
        if self.loop_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("loop_interval_ms must be non-zero"));
        }
        if self.heartbeat_period_ticks == 0 {
            return Err(ConfigError::ValidationFailed("heartbeat_period_ticks must be non-zero"));
        }
        if self.confirm_poll_ms == 0 {
            return Err(ConfigError::ValidationFailed("confirm_poll_ms must be non-zero"));
        }
        if self.adc_full_scale == 0 {
            return Err(ConfigError::ValidationFailed("adc_full_scale must be non-zero"));
        }
        if self.battery_present_volts >= self.low_battery_volts {
            return Err(ConfigError::ValidationFailed(
                "battery_present_volts must be below low_battery_volts",
            ));
        }
        if self.connect_attempts == 0 || self.clock_sync_attempts == 0 {
            return Err(ConfigError::ValidationFailed("retry attempts must be non-zero"));
        }
        for d in &self.devices {
            if d.hourly_ticks == 0 {
                return Err(ConfigError::ValidationFailed("hourly_ticks must be non-zero"));
            }
            if d.battery_cal <= 0.0 {
                return Err(ConfigError::ValidationFailed("battery_cal must be positive"));
            }
        }
        Ok(())
    }

    /// Tuning row for a device index; out-of-range falls back to the last row.
    pub fn tuning(&self, index: usize) -> DeviceTuning {
        self.devices[index.min(DEVICE_COUNT - 1)]
    }

    /// Number of beam polls that make up one confirmation sweep.
    pub fn sweep_polls(&self) -> u32 {
        self.confirm_sweep_secs.saturating_mul(1000) / self.confirm_poll_ms.max(1)
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// WiFi and time-server settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
    pub ntp_host: heapless::String<64>,
}

impl NetworkConfig {
    /// Settings injected by the build script from the environment or `.env`.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        let ntp = option_env!("MOUSETRAP_NTP_HOST").unwrap_or("");
        Ok(Self {
            wifi_ssid: bounded(option_env!("MOUSETRAP_WIFI_SSID").unwrap_or(""), "wifi_ssid too long")?,
            wifi_password: bounded(
                option_env!("MOUSETRAP_WIFI_PASSWORD").unwrap_or(""),
                "wifi_password too long",
            )?,
            ntp_host: bounded(if ntp.is_empty() { "pool.ntp.org" } else { ntp }, "ntp_host too long")?,
        })
    }
}

/// Outbound mail relay and addressing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub smtp_host: heapless::String<64>,
    /// Implicit-TLS submission port.
    pub smtp_port: u16,
    pub username: heapless::String<64>,
    pub password: heapless::String<64>,
    /// Display name placed in the `From:` header.
    pub sender_name: heapless::String<32>,
    pub recipient: heapless::String<64>,
}

impl Default for MailConfig {
    fn default() -> Self {
        let mut smtp_host = heapless::String::new();
        let _ = smtp_host.push_str("smtp.gmail.com");
        Self {
            smtp_host,
            smtp_port: 465,
            username: heapless::String::new(),
            password: heapless::String::new(),
            sender_name: heapless::String::new(),
            recipient: heapless::String::new(),
        }
    }
}

impl MailConfig {
    /// Settings injected by the build script from the environment or `.env`.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        let name = option_env!("MOUSETRAP_SENDER_NAME").unwrap_or("");
        Ok(Self {
            username: bounded(option_env!("MOUSETRAP_SMTP_USER").unwrap_or(""), "smtp user too long")?,
            password: bounded(
                option_env!("MOUSETRAP_SMTP_PASSWORD").unwrap_or(""),
                "smtp password too long",
            )?,
            sender_name: bounded(if name.is_empty() { "Mousetrap" } else { name }, "sender_name too long")?,
            recipient: bounded(option_env!("MOUSETRAP_RECIPIENT").unwrap_or(""), "recipient too long")?,
            ..Self::default()
        })
    }
}

fn bounded<const N: usize>(s: &str, field: &'static str) -> Result<heapless::String<N>, ConfigError> {
    let mut out = heapless::String::new();
    out.push_str(s).map_err(|()| ConfigError::ValidationFailed(field))?;
    Ok(out)
}
