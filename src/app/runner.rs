//! Main loop driver.
//!
//! [`MainLoop`] sequences start-up (network, clock, identity, first battery
//! sample, start-up notice) and then runs one fixed-cadence cycle per call
//! to [`cycle`](MainLoop::cycle): heartbeat → wall clock → controller tick
//! → cadence delay.

use log::{error, info, warn};

use crate::clock::{EPOCH_2000, WallClock};
use crate::config::SystemConfig;
use crate::error::Error;
use crate::identity::TrapIdentity;
use crate::scheduler::Heartbeat;

use super::events::AppEvent;
use super::notices::Notice;
use super::ports::Ports;
use super::retry::{connect_with_retry, sync_with_retry};
use super::service::TrapController;

/// Lifecycle of the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// `startup` has not completed.
    Starting,
    /// Cycling normally (the controller may still be suspended).
    Running,
    /// Start-up failed; `cycle` does nothing until reset.
    Halted,
}

pub struct MainLoop {
    config: SystemConfig,
    status: LoopStatus,
    controller: Option<TrapController>,
    heartbeat: Heartbeat,
}

impl MainLoop {
    pub fn new(config: SystemConfig) -> Self {
        let heartbeat = Heartbeat::new(config.heartbeat_period_ticks);
        Self {
            config,
            status: LoopStatus::Starting,
            controller: None,
            heartbeat,
        }
    }

    /// Bring the trap up.
    ///
    /// A connectivity failure after every retry halts the loop.  A clock
    /// failure falls back to the 2000-01-01 time base and carries on.
    pub fn startup(&mut self, ports: &mut Ports<'_>) -> Result<(), Error> {
        if let Err(e) = self.config.validate() {
            return Err(self.halt(e.into(), ports));
        }

        // 1. Network
        let address = match connect_with_retry(
            &mut *ports.net,
            &mut *ports.delay,
            self.config.connect_attempts,
            self.config.connect_retry_delay_ms,
        ) {
            Ok(addr) => addr,
            Err(e) => return Err(self.halt(e.into(), ports)),
        };
        info!("Network up, address {}", address);

        // 2. Clock
        if let Err(e) = sync_with_retry(
            &mut *ports.clock,
            &mut *ports.delay,
            self.config.clock_sync_attempts,
            self.config.clock_sync_retry_ms,
        ) {
            warn!("Clock sync failed ({}), using the 2000-01-01 time base", e);
            let offset = i64::from(self.config.utc_offset_hours) * 3600;
            ports.clock.set_unix_time(EPOCH_2000 - offset);
        }

        // 3. Identity + controller
        let (strap1, strap2) = ports.hw.read_straps();
        let identity = TrapIdentity::resolve(strap1, strap2, &self.config);
        info!(
            "Identity: {} ({} topology, cal {:.2}, {} ticks/h)",
            identity.name, identity.topology, identity.battery_cal, identity.hourly_ticks
        );
        let mut controller = TrapController::new(identity, self.config.clone(), address);

        // 4. First battery sample
        let now = self.local_time(ports);
        let volts = controller.sample_battery(&now, ports);

        // 5. Start-up notice
        let notice = Notice::startup(identity.name, address, controller.mode(), volts);
        if let Err(e) = ports.mail.send(&now, &notice) {
            warn!("Start-up notice dropped: {}", e);
            ports.events.emit(&AppEvent::NotificationDropped(e));
        }

        ports.events.emit(&AppEvent::Started {
            name: identity.name,
            topology: identity.topology,
            mode: controller.mode(),
            volts,
        });
        self.controller = Some(controller);
        self.status = LoopStatus::Running;
        Ok(())
    }

    /// Run one loop iteration.  Does nothing unless start-up succeeded.
    pub fn cycle(&mut self, ports: &mut Ports<'_>) -> LoopStatus {
        if self.status != LoopStatus::Running {
            return self.status;
        }
        let now = self.local_time(ports);
        let Some(controller) = self.controller.as_mut() else {
            return self.status;
        };

        if !controller.is_suspended() {
            if let Some(level) = self.heartbeat.tick() {
                ports.hw.set_led(level);
            }
        }

        controller.tick(&now, ports);
        ports.delay.delay_ms(self.config.loop_interval_ms);
        self.status
    }

    pub fn status(&self) -> LoopStatus {
        self.status
    }

    pub fn controller(&self) -> Option<&TrapController> {
        self.controller.as_ref()
    }

    fn local_time(&self, ports: &Ports<'_>) -> WallClock {
        WallClock::from_unix(ports.clock.unix_time(), self.config.utc_offset_hours)
    }

    fn halt(&mut self, e: Error, ports: &mut Ports<'_>) -> Error {
        error!("Start-up failed, halting: {}", e);
        self.status = LoopStatus::Halted;
        ports.events.emit(&AppEvent::Halted(e));
        e
    }
}
