//! Integration tests for the TrapController → latches → actuators pipeline.
//!
//! These run on the host (x86_64) and drive whole ticks through the mock
//! adapters, checking actuation, notifications and suspension end to end.

use std::net::Ipv4Addr;

use crate::mock_hw::{HwCall, LEASED, Rig, raw_for};

use mousetrap::app::events::AppEvent;
use mousetrap::app::service::{OperatingMode, TrapController, Verdict};
use mousetrap::clock::WallClock;
use mousetrap::config::SystemConfig;
use mousetrap::error::{ConnectivityError, NotifyError};
use mousetrap::fsm::LatchState;
use mousetrap::identity::{Topology, TrapIdentity};

const SINGLE: (u8, u8) = (0, 0);
const DUAL: (u8, u8) = (0, 1);

fn morning() -> WallClock {
    WallClock::from_unix(Rig::MORNING, 0)
}

fn at(hour: u8, minute: u8) -> WallClock {
    WallClock {
        hour,
        minute,
        ..morning()
    }
}

fn controller_with(straps: (u8, u8), config: SystemConfig) -> TrapController {
    let identity = TrapIdentity::resolve(straps.0, straps.1, &config);
    TrapController::new(identity, config, LEASED)
}

/// A controller that has taken its first battery sample at `volts`, with
/// every record cleared afterwards.
fn sampled(rig: &mut Rig, straps: (u8, u8), volts: f32) -> TrapController {
    let mut c = controller_with(straps, SystemConfig::default());
    rig.hw.battery_raw = raw_for(volts);
    c.sample_battery(&morning(), &mut rig.ports());
    rig.reset_records();
    c
}

// ── Mode selection ───────────────────────────────────────────

#[test]
fn absent_battery_selects_counting_without_warning() {
    let mut rig = Rig::new();
    let mut c = controller_with(DUAL, SystemConfig::default());
    rig.hw.battery_raw = raw_for(1.5);

    let volts = c.sample_battery(&morning(), &mut rig.ports());

    assert!((volts - 1.5).abs() < 0.005, "got {volts}");
    assert_eq!(c.mode(), OperatingMode::Counting);
    assert_eq!(rig.mail.attempts, 0, "no low-battery notice without a battery");
}

#[test]
fn low_battery_selects_armed_and_warns_once() {
    let mut rig = Rig::new();
    let mut c = controller_with(DUAL, SystemConfig::default());
    rig.hw.battery_raw = raw_for(3.9);

    let volts = c.sample_battery(&morning(), &mut rig.ports());

    assert!((volts - 3.9).abs() < 0.005, "got {volts}");
    assert_eq!(c.mode(), OperatingMode::Armed);
    assert_eq!(rig.mail.sent.len(), 1);
    let (_, notice) = &rig.mail.sent[0];
    assert_eq!(notice.subject, "Mousetrap 2 @ 192.168.1.40 battery message");
    assert!(notice.body.contains("3.90 volts"));
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::ModeChanged {
                from: OperatingMode::Counting,
                to: OperatingMode::Armed
            }
        )),
        1
    );
}

#[test]
fn healthy_battery_arms_quietly() {
    let mut rig = Rig::new();
    let c = sampled(&mut rig, DUAL, 4.5);
    assert_eq!(c.mode(), OperatingMode::Armed);
    assert!((c.battery_volts() - 4.5).abs() < 0.005);
}

#[test]
fn sample_reads_twice_and_keeps_second() {
    let mut rig = Rig::new();
    let mut c = controller_with(DUAL, SystemConfig::default());
    rig.hw.battery_queue.extend([raw_for(1.0), raw_for(4.5)]);

    let volts = c.sample_battery(&morning(), &mut rig.ports());

    assert_eq!(rig.hw.battery_reads, 2);
    assert!((volts - 4.5).abs() < 0.005);
    assert_eq!(rig.delay.calls_ms, vec![1000], "one settle delay between reads");
}

// ── Armed firing ─────────────────────────────────────────────

#[test]
fn dual_beam_one_fires_its_solenoid_for_the_hold_time() {
    let mut rig = Rig::new();
    let mut c = sampled(&mut rig, DUAL, 4.5);
    assert_eq!(c.identity().topology, Topology::Dual);
    rig.hw.block_for(0, 1);

    c.tick(&morning(), &mut rig.ports());

    assert_eq!(
        &rig.hw.calls[..3],
        &[
            HwCall::Led(true),
            HwCall::Solenoid {
                channel: 0,
                energised: true
            },
            HwCall::ReleaseAll,
        ]
    );
    assert_eq!(rig.hw.energised_channels(), vec![0]);
    assert_eq!(rig.delay.calls_ms[0], 200, "solenoid hold");
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::BeamFired { channel: 0 })),
        1
    );

    let beam_notices: Vec<_> = rig
        .mail
        .subjects()
        .into_iter()
        .filter(|s| s.starts_with("beam"))
        .collect();
    assert_eq!(beam_notices, vec!["beam 1 of Mousetrap 2 @ 192.168.1.40 has tripped"]);

    // The sweep runs in the same tick and confirms the fired latch.
    assert_eq!(c.latch(0), LatchState::Confirmed);
    assert_eq!(c.latch(1), LatchState::Idle);
}

#[test]
fn sweep_clears_led_and_counts_interruptions() {
    let mut rig = Rig::new();
    let mut c = sampled(&mut rig, DUAL, 4.5);
    // One read to fire, then five polls that still see the beam blocked.
    rig.hw.block_for(0, 6);

    c.tick(&morning(), &mut rig.ports());

    assert_eq!(rig.hw.led_calls(), vec![true, false]);
    let checked = rig.sink.events.iter().find_map(|e| match e {
        AppEvent::CaptureChecked {
            interruptions,
            verdict,
            ..
        } => Some((*interruptions, *verdict)),
        _ => None,
    });
    assert_eq!(checked, Some((5, Verdict::ProbableCatch)));
    assert!(
        rig.mail
            .subjects()
            .contains(&"Mousetrap 2 @ 192.168.1.40 has probably got a mouse!")
    );
    // settle + 600 polls after the hold
    assert_eq!(rig.delay.calls_ms.len(), 1 + 1 + 600);
    assert_eq!(rig.delay.calls_ms[1], 1000);
}

#[test]
fn single_topology_suspends_after_its_sweep() {
    let mut rig = Rig::new();
    let mut c = sampled(&mut rig, SINGLE, 4.5);
    assert_eq!(c.identity().topology, Topology::Single);
    rig.hw.block_for(0, 1);

    c.tick(&morning(), &mut rig.ports());

    assert!(c.is_suspended());
    assert!(
        rig.mail
            .subjects()
            .contains(&"Mousetrap 1 @ 192.168.1.40 - It's probably not a mouse")
    );
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Suspended)), 1);

    // Nothing senses or actuates once suspended.
    rig.reset_records();
    rig.hw.block(0);
    for _ in 0..20 {
        c.tick(&morning(), &mut rig.ports());
    }
    assert!(rig.hw.calls.is_empty(), "calls after suspend: {:?}", rig.hw.calls);
    assert_eq!(rig.hw.beam_reads, 0);
    assert_eq!(rig.mail.attempts, 0);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Suspended)), 0);
}

#[test]
fn dual_with_one_channel_confirmed_keeps_running() {
    let mut rig = Rig::new();
    let mut c = sampled(&mut rig, DUAL, 4.5);
    rig.hw.block(0);

    for _ in 0..5 {
        c.tick(&morning(), &mut rig.ports());
    }

    assert!(!c.is_suspended());
    assert_eq!(c.latch(0), LatchState::Confirmed);
    assert_eq!(c.latch(1), LatchState::Idle);
    assert_eq!(rig.hw.energised_channels(), vec![0], "latched channel fires once");
}

#[test]
fn dual_suspends_once_both_channels_confirmed() {
    let mut rig = Rig::new();
    let mut c = sampled(&mut rig, DUAL, 4.5);

    rig.hw.block_for(0, 1);
    c.tick(&morning(), &mut rig.ports());
    assert!(!c.is_suspended());

    rig.hw.block_for(1, 1);
    c.tick(&morning(), &mut rig.ports());

    assert!(c.is_suspended());
    assert_eq!(rig.hw.energised_channels(), vec![0, 1]);
    assert_eq!(
        c.latch_states().as_slice(),
        &[LatchState::Confirmed, LatchState::Confirmed]
    );
}

#[test]
fn both_beams_in_one_tick_fire_together() {
    let mut rig = Rig::new();
    let mut c = sampled(&mut rig, DUAL, 4.5);
    rig.hw.block_for(0, 1);
    rig.hw.block_for(1, 1);

    c.tick(&morning(), &mut rig.ports());

    assert_eq!(rig.hw.energised_channels(), vec![0, 1]);
    assert_eq!(rig.delay.calls_ms[0], 200, "one shared hold");
    assert!(c.is_suspended());
}

// ── Counting mode ────────────────────────────────────────────

#[test]
fn counting_mode_never_actuates() {
    let mut rig = Rig::new();
    let mut c = sampled(&mut rig, DUAL, 1.5);
    rig.hw.block(0);
    rig.hw.block(1);

    for _ in 0..10 {
        c.tick(&morning(), &mut rig.ports());
    }

    assert!(rig.hw.calls.is_empty(), "calls: {:?}", rig.hw.calls);
    assert_eq!(c.trip_count(), 10, "one count per tick");
    assert_eq!(rig.delay.calls_ms, vec![1000; 10], "cooldown after each count");
    assert_eq!(rig.mail.attempts, 0);
    assert!(!c.is_suspended());
}

// ── Hourly battery check ─────────────────────────────────────

#[test]
fn hourly_check_reevaluates_mode() {
    let mut rig = Rig::new();
    let mut config = SystemConfig::default();
    config.devices[1].hourly_ticks = 3;
    let mut c = controller_with(DUAL, config);
    rig.hw.battery_raw = raw_for(4.5);
    c.sample_battery(&morning(), &mut rig.ports());
    rig.reset_records();

    rig.hw.battery_raw = raw_for(0.2);
    c.tick(&morning(), &mut rig.ports());
    c.tick(&morning(), &mut rig.ports());
    assert_eq!(rig.hw.battery_reads, 0);
    assert_eq!(c.cycle_count(), 2);

    c.tick(&morning(), &mut rig.ports());
    assert_eq!(rig.hw.battery_reads, 2);
    assert_eq!(c.cycle_count(), 0);
    assert_eq!(c.mode(), OperatingMode::Counting);
}

// ── Daily status ─────────────────────────────────────────────

#[test]
fn daily_status_fires_once_per_visit() {
    let mut rig = Rig::new();
    let mut c = sampled(&mut rig, DUAL, 1.5);

    c.tick(&at(12, 0), &mut rig.ports());
    assert_eq!(rig.mail.sent.len(), 1);
    assert!(c.status_sent());

    c.tick(&at(12, 0), &mut rig.ports());
    assert_eq!(rig.mail.sent.len(), 1, "same minute sends nothing more");

    c.tick(&at(12, 1), &mut rig.ports());
    assert!(!c.status_sent(), "flag clears a minute later");
    assert_eq!(rig.mail.sent.len(), 1);

    c.tick(&at(12, 0), &mut rig.ports());
    assert_eq!(rig.mail.sent.len(), 2);
}

#[test]
fn daily_status_reconnects_and_refreshes_address() {
    let mut rig = Rig::new();
    let mut c = sampled(&mut rig, DUAL, 1.5);
    let renewed = Ipv4Addr::new(10, 0, 0, 9);
    rig.net.script.push_back(Ok(renewed));

    c.tick(&at(12, 0), &mut rig.ports());

    assert_eq!(rig.net.connect_calls, 1);
    assert_eq!(c.address(), renewed);
    assert_eq!(
        rig.mail.subjects(),
        vec!["Mousetrap 2 @ 10.0.0.9 mouse-activity mode"]
    );
    assert!(rig.mail.sent[0].1.body.contains("The trip count is 0"));
}

#[test]
fn daily_reconnect_checks_link_first() {
    let mut rig = Rig::new();
    let mut c = sampled(&mut rig, DUAL, 1.5);

    c.tick(&at(12, 0), &mut rig.ports());

    assert_eq!(rig.net.link_checks.get(), 1);
    assert_eq!(rig.net.connect_calls, 1);
}

#[test]
fn daily_reconnect_retries_until_lease() {
    let mut rig = Rig::new();
    let mut c = sampled(&mut rig, DUAL, 4.5);
    let renewed = Ipv4Addr::new(10, 0, 0, 9);
    rig.net
        .script
        .extend([Err(ConnectivityError::ConnectionFailed), Ok(renewed)]);

    c.tick(&at(12, 0), &mut rig.ports());

    assert_eq!(rig.net.connect_calls, 2);
    assert_eq!(c.address(), renewed);
    assert_eq!(
        rig.mail.subjects(),
        vec!["Mousetrap 2 @ 10.0.0.9 is waiting"]
    );
}

#[test]
fn exhausted_reconnect_still_sends_status() {
    let mut rig = Rig::new();
    let mut config = SystemConfig::default();
    config.connect_retry_delay_ms = 250;
    let attempts = config.connect_attempts;
    let mut c = controller_with(DUAL, config);
    rig.hw.battery_raw = raw_for(4.5);
    c.sample_battery(&morning(), &mut rig.ports());
    rig.reset_records();
    rig.net.fallback = Err(ConnectivityError::ConnectionFailed);

    c.tick(&at(12, 0), &mut rig.ports());

    assert_eq!(rig.net.connect_calls, usize::from(attempts));
    let retry_waits = rig.delay.calls_ms.iter().filter(|&&ms| ms == 250).count();
    assert_eq!(retry_waits, usize::from(attempts - 1));
    assert_eq!(c.address(), LEASED);
    assert_eq!(
        rig.mail.subjects(),
        vec!["Mousetrap 2 @ 192.168.1.40 is waiting"]
    );
}

#[test]
fn suspended_trap_reports_awaiting_reset() {
    let mut rig = Rig::new();
    let mut c = sampled(&mut rig, SINGLE, 4.5);
    rig.hw.block_for(0, 1);
    c.tick(&morning(), &mut rig.ports());
    assert!(c.is_suspended());
    rig.reset_records();

    c.tick(&at(12, 0), &mut rig.ports());

    assert_eq!(
        rig.mail.subjects(),
        vec!["Mousetrap 1 @ 192.168.1.40 is awaiting reset"]
    );
}

// ── Notification failures ────────────────────────────────────

#[test]
fn undeliverable_notices_do_not_stop_the_trap() {
    let mut rig = Rig::new();
    let mut c = sampled(&mut rig, SINGLE, 4.5);
    rig.mail.fail_with = Some(NotifyError::ConnectFailed);
    rig.hw.block_for(0, 1);

    c.tick(&morning(), &mut rig.ports());

    assert!(c.is_suspended());
    assert_eq!(rig.mail.attempts, 2, "beam notice and verdict notice");
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::NotificationDropped(NotifyError::ConnectFailed)
        )),
        2
    );
}
