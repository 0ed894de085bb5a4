//! Mock adapters for integration tests.
//!
//! Every port the domain talks to has a recording or scripted stand-in
//! here, so tests can drive the controller and main loop on the host and
//! assert on the full command history.

use std::cell::Cell;
use std::collections::VecDeque;
use std::net::Ipv4Addr;

use embedded_hal::delay::DelayNs;
use mousetrap::app::events::AppEvent;
use mousetrap::app::notices::Notice;
use mousetrap::app::ports::{
    ActuatorPort, ClockPort, ConnectivityPort, EventSink, NotificationPort, Ports, SensorPort,
};
use mousetrap::clock::WallClock;
use mousetrap::error::{ClockError, ConnectivityError, NotifyError};

/// Address handed out by [`ScriptedNet`] unless a test scripts another.
pub const LEASED: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 40);

/// Raw ADC counts that the default device calibration (5.0 V at 4095)
/// scales to `volts`.
pub fn raw_for(volts: f32) -> u16 {
    (volts / 5.0 * 4095.0).round() as u16
}

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    Solenoid { channel: usize, energised: bool },
    ReleaseAll,
    Led(bool),
}

// ── MockHardware ──────────────────────────────────────────────

/// Beam reads left before a blocked channel clears.
const FOREVER: u32 = u32::MAX;

pub struct MockHardware {
    pub calls: Vec<HwCall>,
    /// Remaining interrupted reads per channel (`FOREVER` = stays blocked).
    beams: [u32; 2],
    pub beam_reads: usize,
    /// Values returned by the next battery reads, oldest first.
    pub battery_queue: VecDeque<u16>,
    /// Returned once the queue is empty.
    pub battery_raw: u16,
    pub battery_reads: usize,
    pub straps: (u8, u8),
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            beams: [0; 2],
            beam_reads: 0,
            battery_queue: VecDeque::new(),
            battery_raw: 0,
            battery_reads: 0,
            straps: (0, 0),
        }
    }

    pub fn block(&mut self, channel: usize) {
        self.beams[channel] = FOREVER;
    }

    /// Blocked for the next `reads` reads of this channel, then clear.
    pub fn block_for(&mut self, channel: usize, reads: u32) {
        self.beams[channel] = reads;
    }

    pub fn clear(&mut self, channel: usize) {
        self.beams[channel] = 0;
    }

    pub fn energised_channels(&self) -> Vec<usize> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Solenoid {
                    channel,
                    energised: true,
                } => Some(*channel),
                _ => None,
            })
            .collect()
    }

    pub fn led_calls(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Led(on) => Some(*on),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn beam_interrupted(&mut self, channel: usize) -> bool {
        self.beam_reads += 1;
        match self.beams.get_mut(channel) {
            Some(left) if *left == FOREVER => true,
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        }
    }

    fn read_battery_raw(&mut self) -> u16 {
        self.battery_reads += 1;
        self.battery_queue.pop_front().unwrap_or(self.battery_raw)
    }

    fn read_straps(&mut self) -> (u8, u8) {
        self.straps
    }
}

impl ActuatorPort for MockHardware {
    fn set_solenoid(&mut self, channel: usize, energised: bool) {
        self.calls.push(HwCall::Solenoid { channel, energised });
    }

    fn release_solenoids(&mut self) {
        self.calls.push(HwCall::ReleaseAll);
    }

    fn set_led(&mut self, on: bool) {
        self.calls.push(HwCall::Led(on));
    }
}

// ── VirtualDelay ──────────────────────────────────────────────

/// Records every delay instead of sleeping.
#[derive(Default)]
pub struct VirtualDelay {
    pub calls_ms: Vec<u32>,
    pub total_ns: u64,
}

#[allow(dead_code)]
impl VirtualDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for VirtualDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls_ms.push(ms);
        self.total_ns += u64::from(ms) * 1_000_000;
    }
}

// ── RecordingMailer ───────────────────────────────────────────

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Vec<(WallClock, Notice)>,
    pub attempts: usize,
    /// When set, every send fails with this error.
    pub fail_with: Option<NotifyError>,
}

#[allow(dead_code)]
impl RecordingMailer {
    pub fn subjects(&self) -> Vec<&str> {
        self.sent.iter().map(|(_, n)| n.subject.as_str()).collect()
    }
}

impl NotificationPort for RecordingMailer {
    fn send(&mut self, at: &WallClock, notice: &Notice) -> Result<(), NotifyError> {
        self.attempts += 1;
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.sent.push((*at, notice.clone()));
        Ok(())
    }
}

// ── ScriptedNet ───────────────────────────────────────────────

pub struct ScriptedNet {
    /// Results for the next `connect()` calls, oldest first.
    pub script: VecDeque<Result<Ipv4Addr, ConnectivityError>>,
    /// Returned once the script is exhausted.
    pub fallback: Result<Ipv4Addr, ConnectivityError>,
    pub connect_calls: usize,
    pub link_checks: Cell<usize>,
    connected: bool,
}

#[allow(dead_code)]
impl ScriptedNet {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            fallback: Ok(LEASED),
            connect_calls: 0,
            link_checks: Cell::new(0),
            connected: false,
        }
    }

    pub fn always_failing() -> Self {
        Self {
            fallback: Err(ConnectivityError::ConnectionFailed),
            ..Self::new()
        }
    }
}

impl ConnectivityPort for ScriptedNet {
    fn connect(&mut self) -> Result<Ipv4Addr, ConnectivityError> {
        self.connect_calls += 1;
        let r = self.script.pop_front().unwrap_or(self.fallback);
        self.connected = r.is_ok();
        r
    }

    fn is_connected(&self) -> bool {
        self.link_checks.set(self.link_checks.get() + 1);
        self.connected
    }
}

// ── ManualClock ───────────────────────────────────────────────

pub struct ManualClock {
    pub now: i64,
    pub sync_ok: bool,
    pub sync_calls: usize,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(now: i64) -> Self {
        Self {
            now,
            sync_ok: true,
            sync_calls: 0,
        }
    }
}

impl ClockPort for ManualClock {
    fn sync(&mut self) -> Result<(), ClockError> {
        self.sync_calls += 1;
        if self.sync_ok {
            Ok(())
        } else {
            Err(ClockError::SyncTimeout)
        }
    }

    fn unix_time(&self) -> i64 {
        self.now
    }

    fn set_unix_time(&mut self, secs: i64) {
        self.now = secs;
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// Owns one of every mock and lends them out as a [`Ports`] bundle.
pub struct Rig {
    pub hw: MockHardware,
    pub delay: VirtualDelay,
    pub mail: RecordingMailer,
    pub net: ScriptedNet,
    pub clock: ManualClock,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    /// 2024-03-10 02:00:00 UTC: well away from the default report time.
    pub const MORNING: i64 = 1_710_036_000;

    pub fn new() -> Self {
        Self {
            hw: MockHardware::new(),
            delay: VirtualDelay::default(),
            mail: RecordingMailer::default(),
            net: ScriptedNet::new(),
            clock: ManualClock::at(Self::MORNING),
            sink: RecordingSink::default(),
        }
    }

    pub fn ports(&mut self) -> Ports<'_> {
        Ports {
            hw: &mut self.hw,
            delay: &mut self.delay,
            mail: &mut self.mail,
            net: &mut self.net,
            clock: &mut self.clock,
            events: &mut self.sink,
        }
    }

    /// Forget everything recorded so far.
    pub fn reset_records(&mut self) {
        self.hw.calls.clear();
        self.hw.beam_reads = 0;
        self.hw.battery_reads = 0;
        self.delay = VirtualDelay::default();
        self.mail.sent.clear();
        self.mail.attempts = 0;
        self.net.connect_calls = 0;
        self.net.link_checks.set(0);
        self.sink.events.clear();
    }
}

impl Default for Rig {
    fn default() -> Self {
        Self::new()
    }
}
