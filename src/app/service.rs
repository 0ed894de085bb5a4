//! Trap controller, the hexagonal core.
//!
//! [`TrapController`] owns the operating mode, the beam latches, the trip
//! counter and the timed-task schedule.  All I/O flows through the
//! [`Ports`] bundle injected on every call, making the controller
//! testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ NotificationPort
//!                 │     TrapController     │ ──▶ EventSink
//! ActuatorPort ◀──│ latches · mode · timers│ ◀─▶ ConnectivityPort
//!                 └────────────────────────┘
//! ```

use core::fmt;
use core::net::Ipv4Addr;

use log::{info, warn};

use crate::clock::WallClock;
use crate::config::SystemConfig;
use crate::fsm::{LatchBank, LatchState, MAX_CHANNELS};
use crate::identity::{Topology, TrapIdentity};
use crate::scheduler::{CycleTimer, DailyAlarm};

use super::events::AppEvent;
use super::notices::Notice;
use super::ports::Ports;
use super::retry::connect_with_retry;
use super::sampler::VoltageSampler;

// ───────────────────────────────────────────────────────────────
// Operating mode
// ───────────────────────────────────────────────────────────────

/// What a beam break does.  Re-evaluated on every battery sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    /// Battery fitted: a beam break fires the door.
    Armed,
    /// No battery: beam breaks are only counted.
    Counting,
}

impl OperatingMode {
    pub fn from_voltage(volts: f32, present_floor: f32) -> Self {
        if volts > present_floor {
            Self::Armed
        } else {
            Self::Counting
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Armed => write!(f, "mousetrap"),
            Self::Counting => write!(f, "mouse-activity"),
        }
    }
}

/// Outcome of a confirmation sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Movement was seen after the door closed.
    ProbableCatch,
    /// Nothing moved for the whole sweep.
    NoMovement,
}

// ───────────────────────────────────────────────────────────────
// TrapController
// ───────────────────────────────────────────────────────────────

pub struct TrapController {
    identity: TrapIdentity,
    config: SystemConfig,
    address: Ipv4Addr,
    mode: OperatingMode,
    latches: LatchBank,
    sampler: VoltageSampler,
    battery_volts: f32,
    trip_count: u32,
    hourly: CycleTimer,
    report: DailyAlarm,
    /// Terminal: once set, no further sensing or actuation.
    suspended: bool,
}

impl TrapController {
    /// Build the controller for this device.  Starts in counting mode with
    /// no battery reading; call [`sample_battery`](Self::sample_battery)
    /// before the first tick.
    pub fn new(identity: TrapIdentity, config: SystemConfig, address: Ipv4Addr) -> Self {
        let sampler = VoltageSampler::new(
            identity.battery_cal,
            config.adc_full_scale,
            config.adc_settle_ms,
        );
        Self {
            latches: LatchBank::new(identity.topology),
            hourly: CycleTimer::new(identity.hourly_ticks),
            report: DailyAlarm::new(config.report_hour, config.report_minute),
            identity,
            config,
            address,
            mode: OperatingMode::Counting,
            sampler,
            battery_volts: 0.0,
            trip_count: 0,
            suspended: false,
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle at local time `now`:
    /// hourly battery check → sensors → capture confirmation → daily status.
    pub fn tick(&mut self, now: &WallClock, ports: &mut Ports<'_>) {
        // 1. Hourly battery check
        if self.hourly.tick() {
            self.sample_battery(now, ports);
        }

        if !self.suspended {
            // 2. Sensor evaluation
            self.evaluate_sensors(now, ports);

            // 3. Capture confirmation
            if self.mode == OperatingMode::Armed && self.latches.any_fired() {
                self.confirm_capture(now, ports);
            }
        }

        // 4. Daily status
        if self.report.poll(now.hour, now.minute) {
            self.send_status(now, ports);
        }
    }

    /// Take a battery sample, re-evaluate the mode, and warn if the battery
    /// is fitted but low.  Returns the sampled voltage.
    pub fn sample_battery(&mut self, now: &WallClock, ports: &mut Ports<'_>) -> f32 {
        let volts = self.sampler.sample(&mut *ports.hw, &mut *ports.delay);
        self.battery_volts = volts;
        ports.events.emit(&AppEvent::BatterySampled { volts });

        let mode = OperatingMode::from_voltage(volts, self.config.battery_present_volts);
        if mode != self.mode {
            ports.events.emit(&AppEvent::ModeChanged {
                from: self.mode,
                to: mode,
            });
            self.mode = mode;
        }

        if mode == OperatingMode::Armed && volts < self.config.low_battery_volts {
            warn!("Battery low: {:.2} V", volts);
            let notice = Notice::low_battery(self.identity.name, self.address, volts);
            self.notify(now, &notice, ports);
        }
        volts
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn identity(&self) -> &TrapIdentity {
        &self.identity
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    pub fn latch(&self, channel: usize) -> LatchState {
        self.latches.state(channel)
    }

    pub fn latch_states(&self) -> heapless::Vec<LatchState, MAX_CHANNELS> {
        self.latches.states()
    }

    pub fn battery_volts(&self) -> f32 {
        self.battery_volts
    }

    pub fn trip_count(&self) -> u32 {
        self.trip_count
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Ticks since the last hourly battery check.
    pub fn cycle_count(&self) -> u32 {
        self.hourly.count()
    }

    pub fn status_sent(&self) -> bool {
        self.report.has_fired()
    }

    // ── Internal ──────────────────────────────────────────────

    fn evaluate_sensors(&mut self, now: &WallClock, ports: &mut Ports<'_>) {
        let tripped: heapless::Vec<usize, MAX_CHANNELS> = self
            .latches
            .idle_channels()
            .into_iter()
            .filter(|&ch| ports.hw.beam_interrupted(ch))
            .collect();
        if tripped.is_empty() {
            return;
        }

        match self.mode {
            OperatingMode::Armed => {
                ports.hw.set_led(true);
                for &ch in &tripped {
                    ports.hw.set_solenoid(ch, true);
                }
                ports.delay.delay_ms(self.config.solenoid_hold_ms);
                ports.hw.release_solenoids();

                for &ch in &tripped {
                    if self.latches.fire(ch) {
                        info!("Beam {} tripped, door fired", ch + 1);
                        ports.events.emit(&AppEvent::BeamFired { channel: ch });
                        let notice = Notice::beam_tripped(
                            self.identity.name,
                            self.address,
                            ch,
                            self.config.confirm_sweep_secs,
                        );
                        self.notify(now, &notice, ports);
                    }
                }
            }
            OperatingMode::Counting => {
                self.trip_count = self.trip_count.saturating_add(1);
                ports.events.emit(&AppEvent::TripCounted {
                    total: self.trip_count,
                });
                ports.delay.delay_ms(self.config.counting_cooldown_ms);
            }
        }
    }

    fn confirm_capture(&mut self, now: &WallClock, ports: &mut Ports<'_>) {
        let channels = self.latches.confirm_fired();
        ports.hw.set_led(false);
        ports.delay.delay_ms(self.config.confirm_settle_ms);

        let active = self.latches.channels();
        let mut interruptions = 0u32;
        for _ in 0..self.config.sweep_polls() {
            if (0..active).any(|ch| ports.hw.beam_interrupted(ch)) {
                interruptions += 1;
            }
            ports.delay.delay_ms(self.config.confirm_poll_ms);
        }

        let verdict = if interruptions > 0 {
            Verdict::ProbableCatch
        } else {
            Verdict::NoMovement
        };
        info!(
            "Capture check on {:?}: {} interruptions -> {:?}",
            channels.as_slice(),
            interruptions,
            verdict
        );
        ports.events.emit(&AppEvent::CaptureChecked {
            channels,
            interruptions,
            verdict,
        });
        let notice = Notice::capture(self.identity.name, self.address, verdict);
        self.notify(now, &notice, ports);

        if self.identity.topology == Topology::Single || self.latches.all_confirmed() {
            self.suspended = true;
            ports.hw.release_solenoids();
            info!("{} suspended until reset", self.identity.name);
            ports.events.emit(&AppEvent::Suspended);
        }
    }

    fn send_status(&mut self, now: &WallClock, ports: &mut Ports<'_>) {
        // Reconnect first: the association can drop silently overnight.
        if ports.net.is_connected() {
            info!("Daily reconnect: link reported up, renewing lease");
        } else {
            warn!("Daily reconnect: link reported down");
        }
        match connect_with_retry(
            &mut *ports.net,
            &mut *ports.delay,
            self.config.connect_attempts,
            self.config.connect_retry_delay_ms,
        ) {
            Ok(addr) => {
                self.address = addr;
                ports.events.emit(&AppEvent::Reconnected(addr));
            }
            Err(e) => warn!("Daily reconnect failed, keeping {}: {}", self.address, e),
        }
        let notice = Notice::status(
            self.identity.name,
            self.address,
            self.mode,
            self.battery_volts,
            self.trip_count,
            self.suspended,
        );
        self.notify(now, &notice, ports);
    }

    fn notify(&self, now: &WallClock, notice: &Notice, ports: &mut Ports<'_>) {
        if let Err(e) = ports.mail.send(now, notice) {
            warn!("Notification '{}' dropped: {}", notice.subject, e);
            ports.events.emit(&AppEvent::NotificationDropped(e));
        }
    }
}
