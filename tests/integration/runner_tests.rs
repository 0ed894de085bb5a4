//! Integration tests for MainLoop start-up sequencing and cycling.

use crate::mock_hw::{HwCall, Rig, raw_for};

use mousetrap::app::events::AppEvent;
use mousetrap::app::notices::VERSION;
use mousetrap::app::runner::{LoopStatus, MainLoop};
use mousetrap::app::service::OperatingMode;
use mousetrap::clock::EPOCH_2000;
use mousetrap::config::SystemConfig;
use mousetrap::error::{ConfigError, ConnectivityError, Error};
use mousetrap::identity::{Topology, TrapId};

fn started(rig: &mut Rig, config: SystemConfig) -> MainLoop {
    let mut ml = MainLoop::new(config);
    ml.startup(&mut rig.ports()).unwrap();
    ml
}

// ── Start-up ─────────────────────────────────────────────────

#[test]
fn startup_resolves_identity_and_announces() {
    let mut rig = Rig::new();
    rig.hw.straps = (1, 1);
    rig.hw.battery_raw = raw_for(4.5);

    let ml = started(&mut rig, SystemConfig::default());

    assert_eq!(ml.status(), LoopStatus::Running);
    let c = ml.controller().unwrap();
    assert_eq!(c.identity().id, TrapId::Four);
    assert_eq!(c.identity().topology, Topology::Dual);
    assert_eq!(c.mode(), OperatingMode::Armed);

    assert_eq!(rig.mail.sent.len(), 1);
    let (at, notice) = &rig.mail.sent[0];
    assert_eq!(notice.subject, "Mousetrap 4 @ 192.168.1.40 start-up message");
    assert!(notice.body.starts_with(VERSION));
    assert!(notice.body.contains("4.50 volts"));
    assert_eq!(at.hour, 2);

    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::Started {
                name: "Mousetrap 4",
                ..
            }
        )),
        1
    );
}

#[test]
fn startup_with_low_battery_sends_warning_then_banner() {
    let mut rig = Rig::new();
    rig.hw.battery_raw = raw_for(3.9);

    started(&mut rig, SystemConfig::default());

    let subjects = rig.mail.subjects();
    assert_eq!(subjects.len(), 2);
    assert!(subjects[0].ends_with("battery message"));
    assert!(subjects[1].ends_with("start-up message"));
}

#[test]
fn connect_retries_then_halts() {
    let mut rig = Rig::new();
    rig.net = crate::mock_hw::ScriptedNet::always_failing();
    let config = SystemConfig::default();
    let attempts = config.connect_attempts;
    let mut ml = MainLoop::new(config);

    let r = ml.startup(&mut rig.ports());

    assert_eq!(
        r,
        Err(Error::Connectivity(ConnectivityError::ConnectionFailed))
    );
    assert_eq!(ml.status(), LoopStatus::Halted);
    assert_eq!(rig.net.connect_calls, usize::from(attempts));
    assert_eq!(rig.delay.total_ms(), u64::from(attempts - 1) * 1000);
    assert_eq!(rig.clock.sync_calls, 0);
    assert_eq!(rig.mail.attempts, 0);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Halted(Error::Connectivity(_)))),
        1
    );

    // A halted loop does nothing.
    rig.reset_records();
    rig.hw.block(0);
    assert_eq!(ml.cycle(&mut rig.ports()), LoopStatus::Halted);
    assert!(rig.hw.calls.is_empty());
    assert_eq!(rig.hw.beam_reads, 0);
    assert!(rig.delay.calls_ms.is_empty());
}

#[test]
fn connect_recovers_within_budget() {
    let mut rig = Rig::new();
    for _ in 0..3 {
        rig.net
            .script
            .push_back(Err(ConnectivityError::ConnectionFailed));
    }

    let ml = started(&mut rig, SystemConfig::default());

    assert_eq!(ml.status(), LoopStatus::Running);
    assert_eq!(rig.net.connect_calls, 4);
}

#[test]
fn clock_failure_falls_back_to_2000() {
    let mut rig = Rig::new();
    rig.clock.sync_ok = false;
    let mut config = SystemConfig::default();
    config.utc_offset_hours = 2;
    let attempts = config.clock_sync_attempts;

    let ml = started(&mut rig, config);

    assert_eq!(ml.status(), LoopStatus::Running);
    assert_eq!(rig.clock.sync_calls, usize::from(attempts));
    assert_eq!(rig.clock.now, EPOCH_2000 - 2 * 3600);
    let (at, _) = &rig.mail.sent[0];
    assert_eq!(at.to_string(), "01/01/00 00:00:00");
}

#[test]
fn invalid_config_halts_before_networking() {
    let mut rig = Rig::new();
    let mut config = SystemConfig::default();
    config.loop_interval_ms = 0;
    let mut ml = MainLoop::new(config);

    let r = ml.startup(&mut rig.ports());

    assert!(matches!(
        r,
        Err(Error::Config(ConfigError::ValidationFailed(_)))
    ));
    assert_eq!(ml.status(), LoopStatus::Halted);
    assert_eq!(rig.net.connect_calls, 0);
}

// ── Cycling ──────────────────────────────────────────────────

#[test]
fn cycle_before_startup_is_inert() {
    let mut rig = Rig::new();
    let mut ml = MainLoop::new(SystemConfig::default());
    assert_eq!(ml.cycle(&mut rig.ports()), LoopStatus::Starting);
    assert!(rig.delay.calls_ms.is_empty());
}

#[test]
fn cycle_blinks_heartbeat_and_keeps_cadence() {
    let mut rig = Rig::new();
    let mut config = SystemConfig::default();
    config.heartbeat_period_ticks = 2;
    let mut ml = started(&mut rig, config);
    rig.reset_records();

    for _ in 0..4 {
        assert_eq!(ml.cycle(&mut rig.ports()), LoopStatus::Running);
    }

    assert_eq!(rig.hw.calls, vec![HwCall::Led(true), HwCall::Led(false)]);
    assert_eq!(rig.delay.calls_ms, vec![100; 4]);
}

#[test]
fn cycle_uses_local_time_for_daily_status() {
    let mut rig = Rig::new();
    let mut config = SystemConfig::default();
    config.utc_offset_hours = 10;
    let mut ml = started(&mut rig, config);
    rig.reset_records();

    // 02:00 UTC is 12:00 at UTC+10.
    ml.cycle(&mut rig.ports());

    assert_eq!(rig.mail.sent.len(), 1);
    assert!(rig.mail.sent[0].1.subject.ends_with("mouse-activity mode"));
}

#[test]
fn suspended_trap_stops_heartbeat() {
    let mut rig = Rig::new();
    rig.hw.battery_raw = raw_for(4.5);
    let mut config = SystemConfig::default();
    config.heartbeat_period_ticks = 1;
    let mut ml = started(&mut rig, config);

    rig.hw.block_for(0, 1);
    ml.cycle(&mut rig.ports());
    assert!(ml.controller().unwrap().is_suspended());

    rig.reset_records();
    for _ in 0..3 {
        ml.cycle(&mut rig.ports());
    }
    assert!(rig.hw.led_calls().is_empty());
    assert_eq!(ml.status(), LoopStatus::Running);
}
