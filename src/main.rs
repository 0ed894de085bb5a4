//! Mousetrap Firmware: Main Entry Point
//!
//! Hexagonal architecture around a single blocking main loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   SmtpMailer    SntpClock      │
//! │  (Sensor+Actuator) (EventSink)    (Notify)      (ClockPort)    │
//! │  WifiAdapter       FreeRtos                                    │
//! │  (Connectivity)    (DelayNs)                                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            TrapController (pure logic)                 │    │
//! │  │  BeamLatch · VoltageSampler · CycleTimer · DailyAlarm  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  MainLoop (start-up sequencing · heartbeat · cadence)          │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{error, info, warn};

use mousetrap::adapters::hardware::HardwareAdapter;
use mousetrap::adapters::log_sink::LogEventSink;
use mousetrap::adapters::smtp::SmtpMailer;
use mousetrap::adapters::time::SntpClock;
use mousetrap::adapters::wifi::WifiAdapter;
use mousetrap::app::notices::VERSION;
use mousetrap::app::ports::Ports;
use mousetrap::app::runner::{LoopStatus, MainLoop};
use mousetrap::config::{MailConfig, NetworkConfig, SystemConfig};
use mousetrap::drivers::hw_init;
use mousetrap::drivers::solenoid::SolenoidDriver;
use mousetrap::drivers::status_led::StatusLed;
use mousetrap::error::Error;
use mousetrap::pins;
use mousetrap::sensors::SensorHub;
use mousetrap::sensors::battery::BatteryMonitor;
use mousetrap::sensors::beam::BeamSensor;
use mousetrap::sensors::straps::StrapReader;

/// Idle period while halted; a power cycle is the only way out.
const HALT_IDLE_MS: u32 = 60_000;

fn halt_forever() -> ! {
    loop {
        FreeRtos::delay_ms(HALT_IDLE_MS);
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  {:<36}║", VERSION);
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed, halting: {}", e);
        halt_forever();
    }

    // ── 3. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    let net_config = NetworkConfig::from_build_env().map_err(Error::from)?;
    let mail_config = MailConfig::from_build_env().map_err(Error::from)?;

    // ── 4. Construct adapters ─────────────────────────────────
    let sensor_hub = SensorHub::new(
        [
            BeamSensor::new(0, pins::BEAM_1_GPIO),
            BeamSensor::new(1, pins::BEAM_2_GPIO),
        ],
        BatteryMonitor::new(pins::BATTERY_ADC_CHANNEL),
        StrapReader::new(pins::STRAP_1_GPIO, pins::STRAP_2_GPIO),
    );
    let mut hw = HardwareAdapter::new(
        sensor_hub,
        SolenoidDriver::new(pins::SOLENOID_GPIOS),
        StatusLed::new(pins::LED_GPIO),
    );

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let driver = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?;
    let mut wifi = WifiAdapter::new(driver);
    if let Err(e) = wifi.configure(&net_config) {
        warn!("WiFi credentials rejected: {}", e);
    }

    let mut clock = SntpClock::new(&net_config.ntp_host);
    let mut mailer = SmtpMailer::new(mail_config);
    let mut log_sink = LogEventSink::new();
    let mut delay = FreeRtos;

    let mut ports = Ports {
        hw: &mut hw,
        delay: &mut delay,
        mail: &mut mailer,
        net: &mut wifi,
        clock: &mut clock,
        events: &mut log_sink,
    };

    // ── 5. Start-up sequence ──────────────────────────────────
    let mut main_loop = MainLoop::new(config);
    if let Err(e) = main_loop.startup(&mut ports) {
        error!("Start-up failed ({}), idling until reset", e);
        halt_forever();
    }

    info!("System ready. Entering main loop.");

    // ── 6. Main loop ──────────────────────────────────────────
    loop {
        if main_loop.cycle(&mut ports) == LoopStatus::Halted {
            halt_forever();
        }
    }
}
